//! Audit log repository for database operations.

use async_trait::async_trait;
use chrono::Utc;
use domain::models::{AuditEntry, NewAuditEntry};
use domain::services::{AuditLog, StoreError};
use sqlx::{SqliteConnection, SqlitePool};

use super::db_error;
use crate::entities::task::encode_timestamp;
use crate::entities::AuditLogEntity;
use crate::metrics::QueryTimer;

/// Repository for the append-only audit trail.
#[derive(Clone)]
pub struct AuditLogRepository {
    pool: SqlitePool,
}

impl AuditLogRepository {
    /// Create a new repository instance.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Appends one entry, stamping it with the current time.
pub(crate) async fn insert_entry(
    conn: &mut SqliteConnection,
    entry: &NewAuditEntry,
) -> Result<AuditEntry, StoreError> {
    let timer = QueryTimer::new("insert_audit_entry");
    let result = sqlx::query_as::<_, AuditLogEntity>(
        r#"
        INSERT INTO audit_log (task_id, action, details, timestamp)
        VALUES (?1, ?2, ?3, ?4)
        RETURNING id, task_id, action, details, timestamp
        "#,
    )
    .bind(&entry.task_id)
    .bind(entry.action.as_str())
    .bind(&entry.details)
    .bind(encode_timestamp(&Utc::now()))
    .fetch_one(&mut *conn)
    .await;
    timer.finish(&result);

    AuditEntry::try_from(result.map_err(db_error)?)
}

#[async_trait]
impl AuditLog for AuditLogRepository {
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditEntry, StoreError> {
        let mut conn = self.pool.acquire().await.map_err(db_error)?;
        insert_entry(&mut conn, &entry).await
    }

    async fn list_for_task(
        &self,
        task_id: &str,
        after_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<AuditEntry>, StoreError> {
        let timer = QueryTimer::new("list_audit_entries");
        let result = sqlx::query_as::<_, AuditLogEntity>(
            r#"
            SELECT id, task_id, action, details, timestamp
            FROM audit_log
            WHERE task_id = ?1 AND id > ?2
            ORDER BY id ASC
            LIMIT ?3
            "#,
        )
        .bind(task_id)
        .bind(after_id.unwrap_or(0))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await;
        timer.finish(&result);

        result
            .map_err(db_error)?
            .into_iter()
            .map(AuditEntry::try_from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::test_support::test_pool;
    use domain::models::AuditAction;

    #[tokio::test]
    async fn test_append_assigns_increasing_ids() {
        let (pool, _dir) = test_pool().await;
        let repo = AuditLogRepository::new(pool);

        let first = repo
            .append(NewAuditEntry::upload("task-1", "tender.pdf", "abc"))
            .await
            .unwrap();
        let second = repo
            .append(NewAuditEntry::validate("task-1", 0))
            .await
            .unwrap();

        assert!(second.id > first.id);
        assert!(second.timestamp >= first.timestamp);
        assert_eq!(second.details, "Match index 0 validated.");
    }

    #[tokio::test]
    async fn test_list_for_task_filters_and_orders() {
        let (pool, _dir) = test_pool().await;
        let repo = AuditLogRepository::new(pool);

        repo.append(NewAuditEntry::upload("task-1", "a.pdf", "d1")).await.unwrap();
        repo.append(NewAuditEntry::upload("task-2", "b.pdf", "d2")).await.unwrap();
        repo.append(NewAuditEntry::validate("task-1", 0)).await.unwrap();
        repo.append(NewAuditEntry::proposal("task-1", 1800.0)).await.unwrap();

        let entries = repo.list_for_task("task-1", None, 50).await.unwrap();
        let actions: Vec<_> = entries.iter().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![AuditAction::Upload, AuditAction::Validate, AuditAction::Proposal]
        );
        assert!(entries.iter().all(|e| e.task_id == "task-1"));
    }

    #[tokio::test]
    async fn test_list_for_task_pages_by_id() {
        let (pool, _dir) = test_pool().await;
        let repo = AuditLogRepository::new(pool);
        for i in 0..5 {
            repo.append(NewAuditEntry::validate("task-1", i)).await.unwrap();
        }

        let page = repo.list_for_task("task-1", None, 2).await.unwrap();
        assert_eq!(page.len(), 2);

        let rest = repo
            .list_for_task("task-1", Some(page[1].id), 50)
            .await
            .unwrap();
        assert_eq!(rest.len(), 3);
        assert_eq!(rest[0].details, "Match index 2 validated.");
    }
}
