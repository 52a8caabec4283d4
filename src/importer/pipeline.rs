// ==========================================
// 饮食计划表格导入 - 导入管道编排
// ==========================================
// 状态机: Idle → Reading → Validating → Extracting → {Completed | Failed}
// 执行模型:
// - 每次运行独占一个 tokio 任务，与调用方不共享可变状态
// - 唯一的挂起点是文件读取；逐行扫描在 spawn_blocking 中同步执行
// - 消息经有序通道回传: progress* → 恰好一条终止消息
// - 不支持中途取消；调用方按 run_id 丢弃过期运行的结果
// ==========================================

use crate::config::ImportConfigReader;
use crate::domain::meal::{ParsedDietData, PreliminaryValidationData};
use crate::domain::types::MealSlots;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::extractor::DietMealExtractor;
use crate::importer::file_parser::{DecodeOptions, UniversalFileParser};
use crate::importer::importer_trait::{FileParser, MealExtractor, SheetValidator};
use crate::importer::message::{normalize_failure, FileSource, WorkerMessage, GENERIC_FAILURE_MESSAGE};
use crate::importer::validator::{DietSheetValidator, DEFAULT_PROGRESS_INTERVAL_ROWS};
use crate::perf::PerfGuard;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

// ==========================================
// PipelineMode - 两种工作线程变体
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineMode {
    /// 仅解码 + 校验，终止消息 preliminary-validation
    PreliminaryValidation,
    /// 解码 + 校验 + 提取，终止消息 result
    FullParse,
}

impl PipelineMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineMode::PreliminaryValidation => "PRELIMINARY_VALIDATION",
            PipelineMode::FullParse => "FULL_PARSE",
        }
    }
}

// ==========================================
// PipelineStage - 运行状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Idle,
    Reading,
    Validating,
    Extracting,
    Completed,
    Failed,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStage::Idle => "IDLE",
            PipelineStage::Reading => "READING",
            PipelineStage::Validating => "VALIDATING",
            PipelineStage::Extracting => "EXTRACTING",
            PipelineStage::Completed => "COMPLETED",
            PipelineStage::Failed => "FAILED",
        };
        write!(f, "{}", s)
    }
}

/// 单次运行的状态跟踪（仅用于日志）
struct StageTracker {
    run_id: Uuid,
    stage: PipelineStage,
}

impl StageTracker {
    fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            stage: PipelineStage::Idle,
        }
    }

    fn advance(&mut self, next: PipelineStage) {
        debug!(run_id = %self.run_id, from = %self.stage, to = %next, "管道状态切换");
        self.stage = next;
    }
}

// ==========================================
// PipelineSettings - 单次运行的配置快照
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    pub progress_interval_rows: usize,
    pub meals_per_day: usize,
    pub sheet_index: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            progress_interval_rows: DEFAULT_PROGRESS_INTERVAL_ROWS,
            meals_per_day: crate::domain::types::MAX_MEALS_PER_DAY,
            sheet_index: 0,
        }
    }
}

impl PipelineSettings {
    /// 从配置读取器加载（工作线程内为同步执行，需提前取快照）
    pub async fn load<C: ImportConfigReader + ?Sized>(config: &C) -> ImportResult<Self> {
        let to_import_err = |e: Box<dyn std::error::Error + Send + Sync>| {
            ImportError::InternalError(format!("odczyt konfiguracji: {}", e))
        };

        Ok(Self {
            progress_interval_rows: config
                .get_progress_interval_rows()
                .await
                .map_err(to_import_err)?,
            meals_per_day: config.get_meals_per_day().await.map_err(to_import_err)?,
            sheet_index: config.get_sheet_index().await.map_err(to_import_err)?,
        })
    }

    pub fn meal_slots(&self) -> MealSlots {
        MealSlots::for_meals_per_day(self.meals_per_day)
    }
}

// ==========================================
// DietImportPipeline - 管道本体（构造注入各阶段实现）
// ==========================================
pub struct DietImportPipeline {
    file_parser: Box<dyn FileParser>,
    validator: Box<dyn SheetValidator>,
    extractor: Box<dyn MealExtractor>,
    settings: PipelineSettings,
}

impl DietImportPipeline {
    /// 创建管道
    ///
    /// # 参数
    /// - file_parser: 文件解码器
    /// - validator: 行级校验器
    /// - extractor: 餐次提取器
    /// - settings: 配置快照
    pub fn new(
        file_parser: Box<dyn FileParser>,
        validator: Box<dyn SheetValidator>,
        extractor: Box<dyn MealExtractor>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            file_parser,
            validator,
            extractor,
            settings,
        }
    }

    /// 使用默认组件创建管道
    pub fn with_settings(settings: PipelineSettings) -> Self {
        Self::new(
            Box::new(UniversalFileParser),
            Box::new(DietSheetValidator::new(settings.progress_interval_rows)),
            Box::new(DietMealExtractor),
            settings,
        )
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// 同步执行管道（解码 → 校验 → [提取]）
    ///
    /// # 返回
    /// - Ok(WorkerMessage): 终止消息（Result 或 PreliminaryValidation）
    /// - Err(ImportError): 解码失败等致命错误
    pub fn run(
        &self,
        run_id: Uuid,
        file_name: &str,
        bytes: &[u8],
        mode: PipelineMode,
        on_progress: &mut dyn FnMut(u8),
    ) -> ImportResult<WorkerMessage> {
        let mut tracker = StageTracker::new(run_id);

        // === 阶段 0: 解码 ===
        tracker.advance(PipelineStage::Reading);
        let workbook = {
            let _perf = PerfGuard::new("decode");
            let options = DecodeOptions {
                sheet_index: self.settings.sheet_index,
            };
            match self.file_parser.decode(file_name, bytes, &options) {
                Ok(wb) => wb,
                Err(e) => {
                    tracker.advance(PipelineStage::Failed);
                    return Err(e);
                }
            }
        };
        debug!(run_id = %run_id, sheet = workbook.sheet_name(), "工作表解码完成");

        // === 阶段 1: 校验 ===
        tracker.advance(PipelineStage::Validating);
        let validation = {
            let mut perf = PerfGuard::new("validate");
            let v = self.validator.validate(&workbook, on_progress);
            perf.set_rows(v.total_rows);
            v
        };
        info!(
            run_id = %run_id,
            total_rows = validation.total_rows,
            invalid_rows = validation.errors.len(),
            has_shopping_list = validation.has_shopping_list,
            "表格校验完成"
        );

        if mode == PipelineMode::PreliminaryValidation {
            tracker.advance(PipelineStage::Completed);
            return Ok(WorkerMessage::PreliminaryValidation(PreliminaryValidationData {
                total_rows: validation.total_rows,
                is_valid: validation.is_valid,
                has_shopping_list: validation.has_shopping_list,
                errors: validation.errors,
            }));
        }

        // === 阶段 2: 提取 ===
        tracker.advance(PipelineStage::Extracting);
        let outcome = {
            let mut perf = PerfGuard::new("extract");
            let o = self
                .extractor
                .extract(&workbook, validation.last_row, &self.settings.meal_slots());
            perf.set_rows(o.rows_considered);
            o
        };

        if outcome.rows_considered != validation.total_rows {
            warn!(
                run_id = %run_id,
                validated = validation.total_rows,
                extracted = outcome.rows_considered,
                "校验与提取的数据行数不一致"
            );
        }

        info!(
            run_id = %run_id,
            meals = outcome.meals.len(),
            shopping_items = outcome.shopping_list.len(),
            "餐次提取完成"
        );

        tracker.advance(PipelineStage::Completed);
        Ok(WorkerMessage::Result(ParsedDietData {
            total_rows: validation.total_rows,
            is_valid: validation.is_valid,
            has_shopping_list: validation.has_shopping_list,
            errors: validation.errors,
            meals: outcome.meals,
            shopping_list: outcome.shopping_list,
        }))
    }

    /// 同步完整解析（不经过工作线程）
    pub fn parse(&self, file_name: &str, bytes: &[u8]) -> ImportResult<ParsedDietData> {
        match self.run(Uuid::new_v4(), file_name, bytes, PipelineMode::FullParse, &mut |_| {})? {
            WorkerMessage::Result(data) => Ok(data),
            other => Err(ImportError::InternalError(format!(
                "nieoczekiwany komunikat: {:?}",
                other
            ))),
        }
    }
}

// ==========================================
// PipelineHandle - 单次运行的消息接收端
// ==========================================
pub struct PipelineHandle {
    pub run_id: Uuid,
    pub file_name: String,
    pub mode: PipelineMode,
    receiver: mpsc::UnboundedReceiver<WorkerMessage>,
}

/// 一次运行收集到的全部消息
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub run_id: Uuid,
    pub file_name: String,
    pub mode: PipelineMode,
    pub progress: Vec<u8>,
    pub terminal: WorkerMessage,
}

impl PipelineHandle {
    /// 接收下一条消息（终止消息之后返回 None）
    pub async fn recv(&mut self) -> Option<WorkerMessage> {
        self.receiver.recv().await
    }

    /// 收集全部消息直到终止消息
    pub async fn collect(self) -> PipelineRun {
        self.collect_with(|_| {}).await
    }

    /// 收集全部消息，同时将每条进度转发给回调
    pub async fn collect_with<F: FnMut(u8)>(mut self, mut on_progress: F) -> PipelineRun {
        let mut progress = Vec::new();
        let mut terminal = None;

        while let Some(message) = self.receiver.recv().await {
            match message {
                WorkerMessage::Progress { progress: p } => {
                    on_progress(p);
                    progress.push(p);
                }
                other => {
                    terminal = Some(other);
                    break;
                }
            }
        }

        PipelineRun {
            run_id: self.run_id,
            file_name: self.file_name,
            mode: self.mode,
            progress,
            // 发送端在未发出终止消息前被销毁时兜底
            terminal: terminal
                .unwrap_or_else(|| WorkerMessage::Error(GENERIC_FAILURE_MESSAGE.to_string())),
        }
    }
}

/// 启动一次独立的管道运行
///
/// # 说明
/// - 每次调用创建独立的 tokio 任务与通道
/// - 必须在 tokio 运行时内调用
#[instrument(skip_all, fields(file_name = %source.file_name(), mode = mode.as_str()))]
pub fn spawn_pipeline(
    pipeline: Arc<DietImportPipeline>,
    source: FileSource,
    mode: PipelineMode,
) -> PipelineHandle {
    let run_id = Uuid::new_v4();
    let file_name = source.file_name();
    let (tx, rx) = mpsc::unbounded_channel();

    info!(run_id = %run_id, file_name = %file_name, "启动导入管道");

    let task_file_name = file_name.clone();
    tokio::spawn(async move {
        let terminal = match read_source(source).await {
            Ok(bytes) => {
                let progress_tx = tx.clone();
                let name = task_file_name.clone();
                let joined = tokio::task::spawn_blocking(move || {
                    pipeline.run(run_id, &name, &bytes, mode, &mut |progress| {
                        // 接收端已丢弃（过期运行）时忽略
                        let _ = progress_tx.send(WorkerMessage::Progress { progress });
                    })
                })
                .await;

                match joined {
                    Ok(Ok(message)) => message,
                    Ok(Err(e)) => WorkerMessage::Error(e.to_string()),
                    Err(join_err) => match join_err.try_into_panic() {
                        Ok(payload) => WorkerMessage::Error(normalize_failure(payload)),
                        Err(_) => WorkerMessage::Error(GENERIC_FAILURE_MESSAGE.to_string()),
                    },
                }
            }
            Err(e) => WorkerMessage::Error(e.to_string()),
        };

        if let WorkerMessage::Error(message) = &terminal {
            error!(run_id = %run_id, file_name = %task_file_name, error = %message, "导入管道失败");
        } else {
            info!(run_id = %run_id, file_name = %task_file_name, "导入管道完成");
        }

        let _ = tx.send(terminal);
    });

    PipelineHandle {
        run_id,
        file_name,
        mode,
        receiver: rx,
    }
}

/// 读取上传文件（管道内唯一的异步挂起点）
async fn read_source(source: FileSource) -> ImportResult<Vec<u8>> {
    match source {
        FileSource::Bytes { bytes, .. } => Ok(bytes),
        FileSource::Path(path) => tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ImportError::FileNotFound(path.display().to_string())
            } else {
                ImportError::FileReadError(e.to_string())
            }
        }),
    }
}
