//! Database metrics.
//!
//! Query durations are labelled with the query name and its outcome so that
//! failing statements show up separately from slow ones.

use metrics::{counter, gauge, histogram};
use sqlx::SqlitePool;
use std::time::Instant;

/// Outcome label for a finished query.
fn outcome<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "error"
    }
}

/// Snapshot of the pool's connection counts as gauges.
pub fn record_pool_metrics(pool: &SqlitePool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();

    gauge!("database_connections_total").set(size as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_active").set(size.saturating_sub(idle) as f64);
}

/// Times one statement from construction until [`QueryTimer::finish`].
///
/// ```ignore
/// let timer = QueryTimer::new("get_task");
/// let result = sqlx::query_as::<_, TaskEntity>(...).fetch_optional(&pool).await;
/// timer.finish(&result);
/// ```
#[must_use = "a timer records nothing until finished"]
pub struct QueryTimer {
    query: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            start: Instant::now(),
        }
    }

    pub fn query(&self) -> &'static str {
        self.query
    }

    /// Records the elapsed time, and counts the failure if `result` is an error.
    pub fn finish<T, E>(self, result: &Result<T, E>) {
        let outcome = outcome(result);
        histogram!(
            "database_query_duration_seconds",
            "query" => self.query,
            "outcome" => outcome
        )
        .record(self.start.elapsed().as_secs_f64());

        if result.is_err() {
            counter!("database_query_errors_total", "query" => self.query).increment(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_label() {
        assert_eq!(outcome::<(), ()>(&Ok(())), "ok");
        assert_eq!(outcome::<(), &str>(&Err("boom")), "error");
    }

    #[test]
    fn test_finish_without_recorder_is_noop() {
        let timer = QueryTimer::new("list_tasks");
        assert_eq!(timer.query(), "list_tasks");
        timer.finish(&Err::<(), _>("locked"));
    }

    #[tokio::test]
    async fn test_record_pool_metrics_on_live_pool() {
        let (pool, _dir) = crate::repositories::test_support::test_pool().await;
        record_pool_metrics(&pool);
        assert!(pool.size() >= 1);
    }
}
