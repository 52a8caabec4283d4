// ==========================================
// 饮食计划表格导入 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 行级结构错误不走此类型（作为数据收集到 ValidationError）
// ==========================================

use thiserror::Error;

/// 导入模块错误类型（仅致命错误）
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("Plik nie istnieje: {0}")]
    FileNotFound(String),

    #[error("Nieobsługiwany format pliku: {0} (obsługiwane: .xlsx/.xls/.xlsb/.ods/.csv)")]
    UnsupportedFormat(String),

    #[error("Nie udało się odczytać pliku: {0}")]
    FileReadError(String),

    #[error("Nie udało się odczytać arkusza: {0}")]
    ExcelParseError(String),

    #[error("Nie udało się odczytać pliku CSV: {0}")]
    CsvParseError(String),

    #[error("Plik nie zawiera arkusza o indeksie {0}")]
    SheetNotFound(usize),

    // ===== 通用错误 =====
    #[error("Błąd wewnętrzny: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            ImportError::FileNotFound(err.to_string())
        } else {
            ImportError::FileReadError(err.to_string())
        }
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<calamine::XlsxError>
impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
