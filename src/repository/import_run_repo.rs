// ==========================================
// 饮食计划表格导入 - 导入运行记录仓储
// ==========================================
// 职责: import_run 表的写入与查询
// 时间戳: DateTime<Utc> 直接绑定（rusqlite chrono 特性）
// ==========================================

use crate::importer::pipeline::PipelineRun;
use crate::importer::WorkerMessage;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

// ==========================================
// ImportRunEntity - 导入运行记录
// ==========================================
// 对齐: import_run 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRunEntity {
    pub run_id: String,
    pub file_name: String,
    pub mode: String,   // PRELIMINARY_VALIDATION / FULL_PARSE
    pub status: String, // COMPLETED / FAILED
    pub total_rows: i64,
    pub error_count: i64,
    pub meal_count: i64,
    pub is_valid: bool,
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ImportRunEntity {
    /// 由一次管道运行的终止消息构建记录
    pub fn from_run(run: &PipelineRun, started_at: DateTime<Utc>) -> Self {
        let mut entity = Self {
            run_id: run.run_id.to_string(),
            file_name: run.file_name.clone(),
            mode: run.mode.as_str().to_string(),
            status: "COMPLETED".to_string(),
            total_rows: 0,
            error_count: 0,
            meal_count: 0,
            is_valid: false,
            error_message: None,
            started_at,
            finished_at: Utc::now(),
        };

        match &run.terminal {
            WorkerMessage::Result(data) => {
                entity.total_rows = data.total_rows as i64;
                entity.error_count = data.errors.len() as i64;
                entity.meal_count = data.meals.len() as i64;
                entity.is_valid = data.is_valid;
            }
            WorkerMessage::PreliminaryValidation(data) => {
                entity.total_rows = data.total_rows as i64;
                entity.error_count = data.errors.len() as i64;
                entity.is_valid = data.is_valid;
            }
            WorkerMessage::Error(message) => {
                entity.status = "FAILED".to_string();
                entity.error_message = Some(message.clone());
            }
            WorkerMessage::Progress { .. } => {}
        }

        entity
    }
}

// ==========================================
// ImportRunRepository - 导入运行记录仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct ImportRunRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ImportRunRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入运行记录
    ///
    /// # 返回
    /// - `Ok(run_id)`: 成功插入
    /// - `Err(...)`: 数据库错误（run_id 重复时为唯一约束违反）
    pub fn insert(&self, run: &ImportRunEntity) -> RepositoryResult<String> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO import_run (
                run_id, file_name, mode, status, total_rows, error_count,
                meal_count, is_valid, error_message, started_at, finished_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                run.run_id,
                run.file_name,
                run.mode,
                run.status,
                run.total_rows,
                run.error_count,
                run.meal_count,
                run.is_valid,
                run.error_message,
                run.started_at,
                run.finished_at,
            ],
        )?;

        Ok(run.run_id.clone())
    }

    /// 按 run_id 查询
    pub fn find_by_id(&self, run_id: &str) -> RepositoryResult<ImportRunEntity> {
        let conn = self.get_conn()?;
        conn.query_row(
            "SELECT * FROM import_run WHERE run_id = ?1",
            params![run_id],
            map_run_row,
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "ImportRun".to_string(),
                id: run_id.to_string(),
            },
            other => other.into(),
        })
    }

    /// 最近的运行记录（按开始时间倒序）
    pub fn list_recent(&self, limit: usize) -> RepositoryResult<Vec<ImportRunEntity>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT * FROM import_run ORDER BY started_at DESC, run_id LIMIT ?1")?;

        let rows = stmt.query_map(params![limit as i64], map_run_row)?;

        let mut runs = Vec::new();
        for row in rows {
            runs.push(row?);
        }
        Ok(runs)
    }
}

fn map_run_row(row: &Row<'_>) -> rusqlite::Result<ImportRunEntity> {
    Ok(ImportRunEntity {
        run_id: row.get("run_id")?,
        file_name: row.get("file_name")?,
        mode: row.get("mode")?,
        status: row.get("status")?,
        total_rows: row.get("total_rows")?,
        error_count: row.get("error_count")?,
        meal_count: row.get("meal_count")?,
        is_valid: row.get("is_valid")?,
        error_message: row.get("error_message")?,
        started_at: row.get("started_at")?,
        finished_at: row.get("finished_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_schema;
    use crate::importer::PipelineMode;
    use chrono::Duration;
    use uuid::Uuid;

    fn repo() -> ImportRunRepository {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        ImportRunRepository::new(Arc::new(Mutex::new(conn)))
    }

    fn failed_run() -> PipelineRun {
        PipelineRun {
            run_id: Uuid::new_v4(),
            file_name: "zepsuty.xlsx".to_string(),
            mode: PipelineMode::FullParse,
            progress: vec![],
            terminal: WorkerMessage::Error("Plik uszkodzony".to_string()),
        }
    }

    #[test]
    fn test_insert_and_find_failed_run() {
        let repo = repo();
        let started = Utc::now() - Duration::seconds(2);
        let entity = ImportRunEntity::from_run(&failed_run(), started);

        let id = repo.insert(&entity).unwrap();
        let loaded = repo.find_by_id(&id).unwrap();

        assert_eq!(loaded.status, "FAILED");
        assert_eq!(loaded.mode, "FULL_PARSE");
        assert_eq!(loaded.error_message.as_deref(), Some("Plik uszkodzony"));
        assert!(!loaded.is_valid);
        // DateTime<Utc> 直接绑定，往返无精度损失
        assert_eq!(loaded.started_at, entity.started_at);
        assert_eq!(loaded, entity);
    }

    #[test]
    fn test_find_missing_run() {
        let result = repo().find_by_id("brak");
        assert!(matches!(result, Err(RepositoryError::NotFound { .. })));
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let repo = repo();
        let entity = ImportRunEntity::from_run(&failed_run(), Utc::now());
        repo.insert(&entity).unwrap();

        let result = repo.insert(&entity);
        assert!(matches!(result, Err(RepositoryError::UniqueConstraintViolation(_))));
    }

    #[test]
    fn test_list_recent_orders_newest_first() {
        let repo = repo();
        let now = Utc::now();
        for offset in [30, 10, 20] {
            let entity = ImportRunEntity::from_run(&failed_run(), now - Duration::seconds(offset));
            repo.insert(&entity).unwrap();
        }

        let runs = repo.list_recent(2).unwrap();
        assert_eq!(runs.len(), 2);
        assert!(runs[0].started_at > runs[1].started_at);
    }
}
