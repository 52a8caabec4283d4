// ==========================================
// 饮食计划表格导入 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod import_run_repo;

pub use error::{RepositoryError, RepositoryResult};
pub use import_run_repo::{ImportRunEntity, ImportRunRepository};
