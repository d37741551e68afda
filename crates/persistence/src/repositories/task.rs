//! Task repository for database operations.

use async_trait::async_trait;
use domain::models::{AuditEntry, NewAuditEntry, Task};
use domain::services::{StoreError, TaskStore};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use super::audit_log::insert_entry;
use super::db_error;
use crate::entities::{TaskColumns, TaskEntity};
use crate::metrics::QueryTimer;

/// Repository for task persistence.
#[derive(Clone)]
pub struct TaskRepository {
    pool: SqlitePool,
}

impl TaskRepository {
    /// Creates a new TaskRepository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Inserts or fully replaces a task. The row's insertion sequence is kept on
/// replace.
async fn upsert_task(conn: &mut SqliteConnection, task: &Task) -> Result<(), StoreError> {
    let columns = TaskColumns::encode(task)?;

    let timer = QueryTimer::new("upsert_task");
    let result = sqlx::query(
        r#"
        INSERT INTO tasks (id, status, source_filename, created_at, matches_json, pricing_json)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(id) DO UPDATE SET
            status = excluded.status,
            source_filename = excluded.source_filename,
            created_at = excluded.created_at,
            matches_json = excluded.matches_json,
            pricing_json = excluded.pricing_json
        "#,
    )
    .bind(&task.id)
    .bind(columns.status)
    .bind(&task.source_filename)
    .bind(&columns.created_at)
    .bind(&columns.matches_json)
    .bind(&columns.pricing_json)
    .execute(&mut *conn)
    .await;
    timer.finish(&result);

    result.map_err(db_error)?;
    Ok(())
}

#[async_trait]
impl TaskStore for TaskRepository {
    async fn put(&self, task: &Task) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        upsert_task(&mut conn, task).await
    }

    async fn put_with_audit(
        &self,
        task: &Task,
        entry: NewAuditEntry,
    ) -> Result<AuditEntry, StoreError> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        upsert_task(&mut tx, task).await?;
        let stored = insert_entry(&mut tx, &entry).await?;

        let timer = QueryTimer::new("commit_task_with_audit");
        let result = tx.commit().await;
        timer.finish(&result);
        result.map_err(db_error)?;
        debug!(task_id = %task.id, action = %stored.action, audit_id = stored.id, "Task written with audit entry");
        Ok(stored)
    }

    async fn get(&self, id: &str) -> Result<Option<Task>, StoreError> {
        let timer = QueryTimer::new("get_task");
        let result = sqlx::query_as::<_, TaskEntity>(
            r#"
            SELECT seq, id, status, source_filename, created_at, matches_json, pricing_json
            FROM tasks
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.finish(&result);

        result.map_err(db_error)?.map(Task::try_from).transpose()
    }

    async fn list(&self) -> Result<Vec<Task>, StoreError> {
        let timer = QueryTimer::new("list_tasks");
        let result = sqlx::query_as::<_, TaskEntity>(
            r#"
            SELECT seq, id, status, source_filename, created_at, matches_json, pricing_json
            FROM tasks
            ORDER BY created_at DESC, seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);

        result
            .map_err(db_error)?
            .into_iter()
            .map(Task::try_from)
            .collect()
    }
}
