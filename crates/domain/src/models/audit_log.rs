//! Audit log domain models.
//!
//! Audit entries are append-only: once written they are never updated or
//! deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Default page size when listing audit entries.
pub const DEFAULT_AUDIT_PAGE_SIZE: u32 = 50;

/// Maximum page size when listing audit entries.
pub const MAX_AUDIT_PAGE_SIZE: u32 = 200;

/// Actions recorded against a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// A document was uploaded and matched.
    Upload,
    /// A match was validated by a reviewer.
    Validate,
    /// A priced proposal was generated.
    Proposal,
}

impl AuditAction {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Upload => "UPLOAD",
            AuditAction::Validate => "VALIDATE",
            AuditAction::Proposal => "PROPOSAL",
        }
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UPLOAD" => Ok(AuditAction::Upload),
            "VALIDATE" => Ok(AuditAction::Validate),
            "PROPOSAL" => Ok(AuditAction::Proposal),
            _ => Err(format!("Unknown audit action: {}", s)),
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Monotonic sequence number assigned by the store (write order).
    pub id: i64,
    pub task_id: String,
    pub action: AuditAction,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

/// Input for appending a new audit entry. The timestamp is assigned by the
/// store at write time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub task_id: String,
    pub action: AuditAction,
    pub details: String,
}

impl NewAuditEntry {
    pub fn new(task_id: impl Into<String>, action: AuditAction, details: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            action,
            details: details.into(),
        }
    }

    /// Entry for a completed upload.
    pub fn upload(task_id: &str, filename: &str, digest: &str) -> Self {
        Self::new(
            task_id,
            AuditAction::Upload,
            format!(
                "File {} uploaded and processed. sha256={}",
                filename, digest
            ),
        )
    }

    /// Entry for a validated match.
    pub fn validate(task_id: &str, match_index: usize) -> Self {
        Self::new(
            task_id,
            AuditAction::Validate,
            format!("Match index {} validated.", match_index),
        )
    }

    /// Entry for a generated proposal; the total is embedded in the details.
    pub fn proposal(task_id: &str, total_value: f64) -> Self {
        Self::new(
            task_id,
            AuditAction::Proposal,
            format!("Proposal generated. Value: ${:.2}", total_value),
        )
    }
}

/// Query parameters for listing a task's audit trail.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAuditEntriesQuery {
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

impl ListAuditEntriesQuery {
    /// Page size clamped to the allowed range.
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_AUDIT_PAGE_SIZE)
            .clamp(1, MAX_AUDIT_PAGE_SIZE)
    }
}

/// Response for listing a task's audit trail.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAuditEntriesResponse {
    pub entries: Vec<AuditEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}
