//! Storage abstractions for tasks and their audit trail.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{AuditEntry, NewAuditEntry, Task};

/// Storage errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Corrupt record for task {task_id}: {reason}")]
    Corrupt { task_id: String, reason: String },
}

/// Durable keyed storage for tasks.
///
/// Every write replaces the full task document; there are no partial
/// updates.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts or fully replaces the task with the same id.
    async fn put(&self, task: &Task) -> Result<(), StoreError>;

    /// Writes the task and appends its audit entry atomically.
    async fn put_with_audit(
        &self,
        task: &Task,
        entry: NewAuditEntry,
    ) -> Result<AuditEntry, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Task>, StoreError>;

    /// All tasks, newest first; ties keep insertion order.
    async fn list(&self) -> Result<Vec<Task>, StoreError>;
}

/// Append-only audit trail.
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditEntry, StoreError>;

    /// Entries for one task in write order, starting after `after_id`.
    async fn list_for_task(
        &self,
        task_id: &str,
        after_id: Option<i64>,
        limit: u32,
    ) -> Result<Vec<AuditEntry>, StoreError>;
}
