//! Audit log entity.

use domain::models::{AuditAction, AuditEntry};
use domain::services::StoreError;
use sqlx::FromRow;

use super::task::decode_timestamp;

/// Database entity for audit log rows.
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogEntity {
    /// Monotonic write sequence.
    pub id: i64,
    pub task_id: String,
    pub action: String,
    pub details: String,
    pub timestamp: String,
}

impl TryFrom<AuditLogEntity> for AuditEntry {
    type Error = StoreError;

    fn try_from(entity: AuditLogEntity) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| StoreError::Corrupt {
            task_id: entity.task_id.clone(),
            reason,
        };

        let action: AuditAction = entity.action.parse().map_err(corrupt)?;
        let timestamp = decode_timestamp(&entity.timestamp)
            .map_err(|e| corrupt(format!("bad audit timestamp: {}", e)))?;

        Ok(AuditEntry {
            id: entity.id,
            task_id: entity.task_id,
            action,
            details: entity.details,
            timestamp,
        })
    }
}
