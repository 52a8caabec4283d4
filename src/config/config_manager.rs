// ==========================================
// 饮食计划表格导入 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::import_config_trait::ImportConfigReader;
use crate::db::open_sqlite_connection;
use crate::domain::types::MAX_MEALS_PER_DAY;
use crate::importer::validator::DEFAULT_PROGRESS_INTERVAL_ROWS;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// 配置键
pub mod config_keys {
    pub const PROGRESS_INTERVAL_ROWS: &str = "import/progress_interval_rows";
    pub const MEALS_PER_DAY: &str = "import/meals_per_day";
    pub const SHEET_INDEX: &str = "import/sheet_index";
}

/// 配置作用域（当前仅 global）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigScope {
    Global,
}

impl ConfigScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigScope::Global => "global",
        }
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        crate::db::init_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            crate::db::init_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![ConfigScope::Global.as_str(), key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 读取 usize 配置；缺失或无法解析时返回默认值
    fn get_usize_or_default(&self, key: &str, default: usize) -> ConfigResult<usize> {
        let value = self.get_config_value(key)?;
        Ok(match value {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(v) => v,
                Err(_) => {
                    tracing::warn!(key, value = %raw, default, "配置值无法解析，使用默认值");
                    default
                }
            },
            None => default,
        })
    }

    /// 写入/覆盖 global 配置
    pub fn set_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES (?1, ?2, ?3, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![ConfigScope::Global.as_str(), key, value],
        )?;

        tracing::info!(key, value, "配置已更新");
        Ok(())
    }

    /// 获取所有 global 配置的快照（JSON 格式）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![ConfigScope::Global.as_str()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&config_map)?)
    }
}

#[async_trait]
impl ImportConfigReader for ConfigManager {
    async fn get_progress_interval_rows(&self) -> ConfigResult<usize> {
        let v = self.get_usize_or_default(
            config_keys::PROGRESS_INTERVAL_ROWS,
            DEFAULT_PROGRESS_INTERVAL_ROWS,
        )?;
        Ok(v.max(1))
    }

    async fn get_meals_per_day(&self) -> ConfigResult<usize> {
        let v = self.get_usize_or_default(config_keys::MEALS_PER_DAY, MAX_MEALS_PER_DAY)?;
        Ok(v.clamp(1, MAX_MEALS_PER_DAY))
    }

    async fn get_sheet_index(&self) -> ConfigResult<usize> {
        self.get_usize_or_default(config_keys::SHEET_INDEX, 0)
    }
}
