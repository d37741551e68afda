//! Repository implementations for database operations.

pub mod audit_log;
pub mod task;

pub use audit_log::AuditLogRepository;
pub use task::TaskRepository;

use domain::services::StoreError;

pub(crate) fn db_error(e: sqlx::Error) -> StoreError {
    tracing::error!(error = %e, "Database operation failed");
    StoreError::Database(e.to_string())
}
