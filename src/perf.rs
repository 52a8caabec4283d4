use rusqlite::Connection;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Once;
use std::time::{Duration, Instant};

static SLOW_STAGE_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);
static THRESHOLD_INIT: Once = Once::new();
static SLOW_SQL_THRESHOLD_MS: AtomicU64 = AtomicU64::new(0);

fn is_true(v: &str) -> bool {
    matches!(
        v.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn truncate_sql(sql: &str, max_len: usize) -> String {
    let s = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s,
    }
}

/// 安装 SQLite 语句 trace/profile（慢 SQL 日志）
///
/// 开关：
/// - Debug 默认开启；Release 默认关闭
/// - `DIET_IMPORT_PERF_SQL=1` 强制开启，`=0` 关闭
/// - `DIET_IMPORT_SLOW_SQL_MS=50` 配置慢 SQL 阈值（毫秒）
///
/// # 返回
/// - 是否已安装回调
pub fn install_sqlite_tracing(conn: &mut Connection) -> bool {
    let enabled = match std::env::var("DIET_IMPORT_PERF_SQL") {
        Ok(v) => is_true(&v),
        Err(_) => cfg!(debug_assertions),
    };

    if !enabled {
        conn.trace(None);
        conn.profile(None);
        return false;
    }

    let slow_ms = std::env::var("DIET_IMPORT_SLOW_SQL_MS")
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(if cfg!(debug_assertions) { 50 } else { 200 });
    SLOW_SQL_THRESHOLD_MS.store(slow_ms, Ordering::Relaxed);

    conn.trace(Some(sql_trace_callback));
    conn.profile(Some(sql_profile_callback));
    true
}

fn sql_trace_callback(sql: &str) {
    tracing::trace!(target: "sql", sql = %truncate_sql(sql, 200), "sql");
}

fn sql_profile_callback(sql: &str, duration: Duration) {
    let ms = duration.as_millis() as u64;
    let threshold = SLOW_SQL_THRESHOLD_MS.load(Ordering::Relaxed);
    if threshold > 0 && ms >= threshold {
        tracing::warn!(
            target: "slow_sql",
            duration_ms = ms,
            sql = %truncate_sql(sql, 420),
            "slow sql"
        );
    }
}

/// 慢阶段阈值（毫秒）
///
/// 开关：
/// - `DIET_IMPORT_SLOW_STAGE_MS=500` 配置慢阶段告警阈值
/// - 未配置时 Debug 200ms / Release 1000ms；配置为 0 关闭告警
fn slow_stage_threshold_ms() -> u64 {
    THRESHOLD_INIT.call_once(|| {
        let ms = std::env::var("DIET_IMPORT_SLOW_STAGE_MS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .unwrap_or(if cfg!(debug_assertions) { 200 } else { 1000 });
        SLOW_STAGE_THRESHOLD_MS.store(ms, Ordering::Relaxed);
    });
    SLOW_STAGE_THRESHOLD_MS.load(Ordering::Relaxed)
}

/// 性能统计 Guard：记录 elapsed_ms + 处理行数
///
/// 使用方式：
/// ```ignore
/// let mut perf = diet_sheet_import::perf::PerfGuard::new("validate");
/// // do work...
/// perf.set_rows(total_rows);
/// ```
pub struct PerfGuard {
    op: &'static str,
    start: Instant,
    rows: Option<usize>,
}

impl PerfGuard {
    pub fn new(op: &'static str) -> Self {
        Self {
            op,
            start: Instant::now(),
            rows: None,
        }
    }

    pub fn set_rows(&mut self, rows: usize) {
        self.rows = Some(rows);
    }
}

impl Drop for PerfGuard {
    fn drop(&mut self) {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;

        tracing::info!(
            target: "perf",
            op = self.op,
            elapsed_ms,
            rows = ?self.rows,
            "done"
        );

        let threshold = slow_stage_threshold_ms();
        if threshold > 0 && elapsed_ms >= threshold {
            tracing::warn!(
                target: "perf",
                op = self.op,
                elapsed_ms,
                threshold_ms = threshold,
                "slow stage"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_sql_collapses_whitespace() {
        assert_eq!(truncate_sql("SELECT *\n    FROM import_run", 100), "SELECT * FROM import_run");
        assert_eq!(truncate_sql("SELECT value FROM config_kv", 6), "SELECT…");
    }

    #[test]
    fn test_traced_connection_still_executes() {
        let mut conn = Connection::open_in_memory().unwrap();
        install_sqlite_tracing(&mut conn);

        let v: i64 = conn.query_row("SELECT 1 + 1", [], |row| row.get(0)).unwrap();
        assert_eq!(v, 2);
    }
}
