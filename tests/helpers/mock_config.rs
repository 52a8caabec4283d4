// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use async_trait::async_trait;
use diet_sheet_import::config::ImportConfigReader;
use std::error::Error;

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub progress_interval_rows: usize,
    pub meals_per_day: usize,
    pub sheet_index: usize,
    /// 为 true 时所有读取返回错误
    pub broken: bool,
}

impl MockConfig {
    /// 创建默认配置
    pub fn default() -> Self {
        Self {
            progress_interval_rows: 1000,
            meals_per_day: 5,
            sheet_index: 0,
            broken: false,
        }
    }

    pub fn with_meals_per_day(meals_per_day: usize) -> Self {
        let mut config = Self::default();
        config.meals_per_day = meals_per_day;
        config
    }

    pub fn with_progress_interval(rows: usize) -> Self {
        let mut config = Self::default();
        config.progress_interval_rows = rows;
        config
    }

    pub fn broken() -> Self {
        let mut config = Self::default();
        config.broken = true;
        config
    }

    fn read(&self, value: usize) -> Result<usize, Box<dyn Error + Send + Sync>> {
        if self.broken {
            Err("config store unavailable".into())
        } else {
            Ok(value)
        }
    }
}

#[async_trait]
impl ImportConfigReader for MockConfig {
    async fn get_progress_interval_rows(&self) -> Result<usize, Box<dyn Error + Send + Sync>> {
        self.read(self.progress_interval_rows)
    }

    async fn get_meals_per_day(&self) -> Result<usize, Box<dyn Error + Send + Sync>> {
        self.read(self.meals_per_day)
    }

    async fn get_sheet_index(&self) -> Result<usize, Box<dyn Error + Send + Sync>> {
        self.read(self.sheet_index)
    }
}
