// ==========================================
// 饮食计划表格导入 - 配置层
// ==========================================
// 职责: 导入管道配置读取与覆写
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod import_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager, ConfigScope};
pub use import_config_trait::ImportConfigReader;
