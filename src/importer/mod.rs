// ==========================================
// 饮食计划表格导入 - 导入层
// ==========================================
// 职责: 表格文件 → 校验结果 / 餐次 / 购物清单
// 支持: Excel, OpenDocument, CSV
// ==========================================

// 模块声明
pub mod error;
pub mod extractor;
pub mod file_parser;
pub mod importer_trait;
pub mod message;
pub mod nutrition;
pub mod pipeline;
pub mod validator;
pub mod workbook;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use extractor::{split_ingredients, DietMealExtractor, ExtractionOutcome};
pub use file_parser::{CsvParser, DecodeOptions, ExcelParser, UniversalFileParser};
pub use message::{normalize_failure, FileSource, WorkerMessage, GENERIC_FAILURE_MESSAGE};
pub use nutrition::parse_nutritional_values;
pub use pipeline::{
    spawn_pipeline, DietImportPipeline, PipelineHandle, PipelineMode, PipelineRun,
    PipelineSettings, PipelineStage,
};
pub use validator::{
    DietSheetValidator, SheetValidation, MISSING_INGREDIENTS, MISSING_MEAL_NAME,
    MISSING_PREPARATION,
};
pub use workbook::{DeclaredRange, SheetColumn, SheetRow, Workbook};

// 重导出 Trait 接口
pub use importer_trait::{FileParser, MealExtractor, SheetValidator};
