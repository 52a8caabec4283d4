// ==========================================
// 饮食计划表格导入 - API 层
// ==========================================
// 职责: 组装配置、管道与运行记录，供 CLI / 上层调用
// ==========================================

pub mod error;
pub mod import_api;

// 重导出核心类型
pub use error::{ApiError, ApiResult};
pub use import_api::{BatchValidationItem, ImportApi};
