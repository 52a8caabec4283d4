// ==========================================
// 饮食计划表格导入 - 工作线程消息协议
// ==========================================
// 方向: 工作线程 → 消费方
// 格式: {"type": "...", "data": ...}
// 顺序: progress* → 恰好一条终止消息（result / preliminary-validation / error）
// ==========================================

use crate::domain::meal::{ParsedDietData, PreliminaryValidationData};
use crate::importer::error::ImportError;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::path::PathBuf;

/// 无法识别的错误对象时使用的兜底文案
pub const GENERIC_FAILURE_MESSAGE: &str = "Wystąpił nieznany błąd podczas przetwarzania pliku";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "kebab-case")]
pub enum WorkerMessage {
    /// 进度（0-100，仅供参考）
    Progress { progress: u8 },
    /// 完整解析结果
    Result(ParsedDietData),
    /// 预校验结果
    PreliminaryValidation(PreliminaryValidationData),
    /// 致命错误（已规范化为文本）
    Error(String),
}

impl WorkerMessage {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkerMessage::Progress { .. })
    }
}

// ==========================================
// FileSource - 上传文件句柄
// ==========================================
#[derive(Debug, Clone)]
pub enum FileSource {
    Path(PathBuf),
    Bytes { file_name: String, bytes: Vec<u8> },
}

impl FileSource {
    pub fn file_name(&self) -> String {
        match self {
            FileSource::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string()),
            FileSource::Bytes { file_name, .. } => file_name.clone(),
        }
    }
}

// ==========================================
// 错误文本规范化
// ==========================================
// 优先级:
// 1. 已知错误类型（ImportError / 标准错误）的 Display
// 2. 字符串载荷
// 3. 带 message 的任意错误对象（anyhow）
// 4. 兜底文案
pub fn normalize_failure(payload: Box<dyn Any + Send>) -> String {
    let payload = match payload.downcast::<ImportError>() {
        Ok(err) => return err.to_string(),
        Err(other) => other,
    };
    let payload = match payload.downcast::<Box<dyn std::error::Error + Send + Sync>>() {
        Ok(err) => return err.to_string(),
        Err(other) => other,
    };
    let payload = match payload.downcast::<&'static str>() {
        Ok(s) => return s.to_string(),
        Err(other) => other,
    };
    let payload = match payload.downcast::<String>() {
        Ok(s) => return *s,
        Err(other) => other,
    };
    match payload.downcast::<anyhow::Error>() {
        Ok(err) => err.to_string(),
        Err(_) => GENERIC_FAILURE_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_message_shape() {
        let json = serde_json::to_value(WorkerMessage::Progress { progress: 40 }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "progress", "data": {"progress": 40}}));
    }

    #[test]
    fn test_terminal_message_tags() {
        let preliminary = WorkerMessage::PreliminaryValidation(PreliminaryValidationData {
            total_rows: 1,
            is_valid: true,
            has_shopping_list: false,
            errors: vec![],
        });
        let json = serde_json::to_value(&preliminary).unwrap();
        assert_eq!(json["type"], "preliminary-validation");
        assert_eq!(json["data"]["totalRows"], 1);

        let error = serde_json::to_value(WorkerMessage::Error("zły plik".to_string())).unwrap();
        assert_eq!(error, serde_json::json!({"type": "error", "data": "zły plik"}));

        assert!(preliminary.is_terminal());
        assert!(!WorkerMessage::Progress { progress: 1 }.is_terminal());
    }

    #[test]
    fn test_normalize_failure_priority() {
        let import_err: Box<dyn Any + Send> = Box::new(ImportError::SheetNotFound(2));
        assert_eq!(
            normalize_failure(import_err),
            ImportError::SheetNotFound(2).to_string()
        );

        assert_eq!(normalize_failure(Box::new("boom")), "boom");
        assert_eq!(normalize_failure(Box::new("kaboom".to_string())), "kaboom");
        assert_eq!(
            normalize_failure(Box::new(anyhow::anyhow!("z anyhow"))),
            "z anyhow"
        );
        assert_eq!(normalize_failure(Box::new(42_u32)), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_file_source_name() {
        let source = FileSource::Path(PathBuf::from("/tmp/diety/plan.xlsx"));
        assert_eq!(source.file_name(), "plan.xlsx");

        let source = FileSource::Bytes {
            file_name: "plan.csv".to_string(),
            bytes: vec![],
        };
        assert_eq!(source.file_name(), "plan.csv");
    }
}
