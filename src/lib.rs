// ==========================================
// 饮食计划表格导入 - 核心库
// ==========================================
// 职责: 表格文件 → 校验 → 餐次/购物清单/营养值 → 饮食计划
// 技术栈: Rust + tokio + calamine + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 餐次与饮食计划
pub mod domain;

// 导入层 - 文件解码、校验、提取、工作线程管道
pub mod importer;

// 配置层 - 导入配置
pub mod config;

// 数据仓储层 - 导入运行记录
pub mod repository;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 阶段耗时统计
pub mod perf;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    Diet, DietDraft, MealSlots, MealType, NutritionalValues, ParsedDietData, ParsedMeal,
    PreliminaryValidationData, ValidationError,
};

// 导入管道
pub use importer::{
    spawn_pipeline, DietImportPipeline, FileSource, ImportError, PipelineHandle, PipelineMode,
    PipelineSettings, WorkerMessage,
};

// API
pub use api::{ApiError, ImportApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "diet-sheet-import";
