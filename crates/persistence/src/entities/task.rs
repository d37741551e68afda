//! Task entity.

use chrono::{DateTime, SecondsFormat, Utc};
use domain::models::{Match, Proposal, Task, TaskStatus};
use domain::services::StoreError;
use sqlx::FromRow;

/// Database entity for tasks.
#[derive(Debug, Clone, FromRow)]
pub struct TaskEntity {
    /// Insertion sequence, stable across updates.
    pub seq: i64,
    pub id: String,
    pub status: String,
    pub source_filename: String,
    /// RFC 3339 with fixed nanosecond precision.
    pub created_at: String,
    pub matches_json: String,
    pub pricing_json: Option<String>,
}

/// Encodes a timestamp so that lexical order equals chronological order.
pub fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|ts| ts.with_timezone(&Utc))
}

/// Serialized column values for writing a task.
#[derive(Debug, Clone)]
pub struct TaskColumns {
    pub status: &'static str,
    pub created_at: String,
    pub matches_json: String,
    pub pricing_json: Option<String>,
}

impl TaskColumns {
    pub fn encode(task: &Task) -> Result<Self, StoreError> {
        let corrupt = |e: serde_json::Error| StoreError::Corrupt {
            task_id: task.id.clone(),
            reason: e.to_string(),
        };

        Ok(Self {
            status: task.status.as_str(),
            created_at: encode_timestamp(&task.created_at),
            matches_json: serde_json::to_string(&task.matches).map_err(corrupt)?,
            pricing_json: task
                .pricing
                .as_ref()
                .map(serde_json::to_string)
                .transpose()
                .map_err(corrupt)?,
        })
    }
}

impl TryFrom<TaskEntity> for Task {
    type Error = StoreError;

    fn try_from(entity: TaskEntity) -> Result<Self, Self::Error> {
        let corrupt = |reason: String| StoreError::Corrupt {
            task_id: entity.id.clone(),
            reason,
        };

        let status: TaskStatus = entity.status.parse().map_err(corrupt)?;
        let created_at = decode_timestamp(&entity.created_at)
            .map_err(|e| corrupt(format!("bad created_at: {}", e)))?;
        let matches: Vec<Match> = serde_json::from_str(&entity.matches_json)
            .map_err(|e| corrupt(format!("bad matches: {}", e)))?;
        let pricing: Option<Proposal> = entity
            .pricing_json
            .as_deref()
            .map(|raw| serde_json::from_str(raw))
            .transpose()
            .map_err(|e| corrupt(format!("bad pricing: {}", e)))?;

        Ok(Task {
            id: entity.id,
            status,
            source_filename: entity.source_filename,
            created_at,
            matches,
            pricing,
        })
    }
}
