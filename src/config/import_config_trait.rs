// ==========================================
// 饮食计划表格导入 - 导入配置读取 Trait
// ==========================================
// 职责: 定义导入管道所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// ImportConfigReader Trait
// ==========================================
// 用途: 导入管道所需的配置读取接口
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait ImportConfigReader: Send + Sync {
    /// 获取进度上报间隔（行）
    ///
    /// # 默认值
    /// - 1000
    async fn get_progress_interval_rows(&self) -> Result<usize, Box<dyn Error + Send + Sync>>;

    /// 获取每日餐次数量（决定餐次模板）
    ///
    /// # 默认值
    /// - 5
    ///
    /// # 说明
    /// - 超出 1..=5 时由调用方钳制
    async fn get_meals_per_day(&self) -> Result<usize, Box<dyn Error + Send + Sync>>;

    /// 获取读取的工作表索引
    ///
    /// # 默认值
    /// - 0（第一个工作表）
    async fn get_sheet_index(&self) -> Result<usize, Box<dyn Error + Send + Sync>>;
}
