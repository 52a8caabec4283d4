// ==========================================
// 饮食计划表格导入 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换导入层/仓储层错误为调用方可读的错误消息
// ==========================================

use crate::domain::diet::DietError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("Nieprawidłowe dane wejściowe: {0}")]
    InvalidInput(String),

    #[error("Nie znaleziono: {0}")]
    NotFound(String),

    // ==========================================
    // 导入错误
    // ==========================================
    /// 管道终止消息为 error 时携带其文本
    #[error("{0}")]
    ImportError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("Błąd bazy danych: {0}")]
    DatabaseError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("Błąd wewnętrzny: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::InternalError(msg) => ApiError::InternalError(msg),
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})", entity, id))
            }
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

// ==========================================
// 从 DietError 转换
// ==========================================
impl From<DietError> for ApiError {
    fn from(err: DietError) -> Self {
        ApiError::InvalidInput(err.to_string())
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
