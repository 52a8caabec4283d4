// ==========================================
// 饮食计划导入API
// ==========================================
// 职责: 组装配置快照 + 导入管道 + 运行记录
// 说明: 每次调用独立启动一次管道运行，运行结果写入 import_run
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::db::open_sqlite_connection;
use crate::domain::diet::{Diet, DietDraft};
use crate::domain::meal::{ParsedDietData, PreliminaryValidationData};
use crate::importer::{
    spawn_pipeline, DietImportPipeline, FileSource, PipelineMode, PipelineRun, PipelineSettings,
    WorkerMessage,
};
use crate::repository::{ImportRunEntity, ImportRunRepository};
use chrono::Utc;
use futures::future::join_all;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// 批量预校验的单个文件结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchValidationItem {
    pub run_id: String,
    pub file_name: String,
    /// 预校验结果（失败时为 None）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<PreliminaryValidationData>,
    /// 失败原因（成功时为 None）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 导入API
pub struct ImportApi {
    config: ConfigManager,
    run_repo: ImportRunRepository,
}

impl ImportApi {
    /// 创建新的ImportApi实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（配置与运行记录共用）
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| ApiError::DatabaseError(format!("{}: {}", db_path, e)))?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建（测试/嵌入场景）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        let config = ConfigManager::from_connection(conn.clone())
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        Ok(Self {
            config,
            run_repo: ImportRunRepository::new(conn),
        })
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    /// 预校验文件（不提取餐次）
    ///
    /// # 返回
    /// - Ok(PreliminaryValidationData): 行级错误包含在 errors 中
    /// - Err(ApiError::ImportError): 文件无法读取或解码
    pub async fn preliminary_validate(
        &self,
        source: FileSource,
    ) -> ApiResult<PreliminaryValidationData> {
        let pipeline = self.pipeline().await?;
        let run = self
            .execute(pipeline, source, PipelineMode::PreliminaryValidation, |_| {})
            .await;

        match run.terminal {
            WorkerMessage::PreliminaryValidation(data) => Ok(data),
            other => Err(unexpected_terminal(other)),
        }
    }

    /// 完整解析文件
    ///
    /// # 参数
    /// - source: 文件来源
    /// - on_progress: 进度回调（0..=100，单调不减，仅供展示）
    pub async fn parse_diet_file<F: FnMut(u8)>(
        &self,
        source: FileSource,
        on_progress: F,
    ) -> ApiResult<ParsedDietData> {
        let pipeline = self.pipeline().await?;
        let run = self
            .execute(pipeline, source, PipelineMode::FullParse, on_progress)
            .await;

        match run.terminal {
            WorkerMessage::Result(data) => Ok(data),
            other => Err(unexpected_terminal(other)),
        }
    }

    /// 并发预校验多个文件
    ///
    /// # 说明
    /// - 各文件运行相互独立，单个文件失败不影响其余文件
    /// - 返回顺序与输入顺序一致
    pub async fn batch_preliminary_validate(
        &self,
        sources: Vec<FileSource>,
    ) -> ApiResult<Vec<BatchValidationItem>> {
        let pipeline = self.pipeline().await?;
        info!(files = sources.len(), "批量预校验开始");

        let runs = join_all(sources.into_iter().map(|source| {
            self.execute(
                pipeline.clone(),
                source,
                PipelineMode::PreliminaryValidation,
                |_| {},
            )
        }))
        .await;

        Ok(runs
            .into_iter()
            .map(|run| {
                let (result, error) = match run.terminal {
                    WorkerMessage::PreliminaryValidation(data) => (Some(data), None),
                    other => (None, Some(unexpected_terminal(other).to_string())),
                };
                BatchValidationItem {
                    run_id: run.run_id.to_string(),
                    file_name: run.file_name,
                    result,
                    error,
                }
            })
            .collect())
    }

    /// 由解析结果构建多日饮食计划
    ///
    /// # 返回
    /// - Err(ApiError::InvalidInput): 名称为空、没有任何餐次或日期超出范围
    ///
    /// # 说明
    /// - 天的划分沿用解析时分配的餐次，与当前 meals_per_day 配置无关
    pub async fn build_diet(&self, parsed: &ParsedDietData, draft: DietDraft) -> ApiResult<Diet> {
        if draft.name.trim().is_empty() {
            return Err(ApiError::InvalidInput(
                "nazwa diety nie może być pusta".to_string(),
            ));
        }
        if parsed.meals.is_empty() {
            return Err(ApiError::InvalidInput(
                "plik nie zawiera żadnych posiłków".to_string(),
            ));
        }

        let diet = Diet::from_parsed(parsed, draft)?;

        info!(
            diet_id = %diet.diet_id,
            days = diet.days.len(),
            meals = diet.meal_count(),
            "饮食计划已构建"
        );
        Ok(diet)
    }

    /// 最近的导入运行记录
    pub async fn list_recent_runs(&self, limit: usize) -> ApiResult<Vec<ImportRunEntity>> {
        let limit = limit.clamp(1, 100);
        Ok(self.run_repo.list_recent(limit)?)
    }

    /// 按 run_id 查询单次运行记录
    ///
    /// # 返回
    /// - Err(ApiError::NotFound): 记录不存在
    pub async fn get_run(&self, run_id: &str) -> ApiResult<ImportRunEntity> {
        let run_id = run_id.trim();
        if run_id.is_empty() {
            return Err(ApiError::InvalidInput("run_id nie może być pusty".to_string()));
        }
        Ok(self.run_repo.find_by_id(run_id)?)
    }

    // ==========================================
    // 内部辅助
    // ==========================================

    /// 按当前配置创建管道（每次调用读取一次配置快照）
    async fn pipeline(&self) -> ApiResult<Arc<DietImportPipeline>> {
        let settings = PipelineSettings::load(&self.config).await?;
        Ok(Arc::new(DietImportPipeline::with_settings(settings)))
    }

    /// 启动一次运行，等待终止消息并写入运行记录
    async fn execute<F: FnMut(u8)>(
        &self,
        pipeline: Arc<DietImportPipeline>,
        source: FileSource,
        mode: PipelineMode,
        on_progress: F,
    ) -> PipelineRun {
        let started_at = Utc::now();
        let run = spawn_pipeline(pipeline, source, mode)
            .collect_with(on_progress)
            .await;

        // 记录失败不影响本次导入结果
        let entity = ImportRunEntity::from_run(&run, started_at);
        if let Err(e) = self.run_repo.insert(&entity) {
            warn!(run_id = %run.run_id, error = %e, "导入运行记录写入失败");
        }

        run
    }
}

/// 非预期的终止消息 → ApiError
fn unexpected_terminal(message: WorkerMessage) -> ApiError {
    match message {
        WorkerMessage::Error(text) => ApiError::ImportError(text),
        other => ApiError::InternalError(format!("nieoczekiwany komunikat: {:?}", other)),
    }
}
