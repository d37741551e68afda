//! Tender-processing task domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Note stored on a validated match when the reviewer supplied none.
pub const DEFAULT_VALIDATION_NOTE: &str = "Auto-approved";

/// Route prefix under which proposal artifacts are downloadable.
pub const DOWNLOAD_PATH_PREFIX: &str = "/export/download";

/// Lifecycle status of a task.
///
/// Variants are ordered by lifecycle stage; a task's status never moves
/// backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Created,
    Matched,
    Validated,
    Priced,
}

impl TaskStatus {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Created => "created",
            TaskStatus::Matched => "matched",
            TaskStatus::Validated => "validated",
            TaskStatus::Priced => "priced",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(TaskStatus::Created),
            "matched" => Ok(TaskStatus::Matched),
            "validated" => Ok(TaskStatus::Validated),
            "priced" => Ok(TaskStatus::Priced),
            _ => Err(format!("Unknown task status: {}", s)),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A candidate catalog item proposed by the matching engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub validated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_note: Option<String>,
}

impl Match {
    pub fn new(sku: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            name: name.into(),
            confidence: 0.0,
            reason: None,
            category: None,
            validated: false,
            validation_note: None,
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Marks the match as validated, falling back to [`DEFAULT_VALIDATION_NOTE`].
    pub fn mark_validated(&mut self, note: Option<String>) {
        self.validated = true;
        self.validation_note = Some(note.unwrap_or_else(|| DEFAULT_VALIDATION_NOTE.to_string()));
    }
}

/// One priced line of a proposal, in the same order as the task's matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedItem {
    pub sku: String,
    pub description: String,
    pub base_cost: f64,
    pub sell_price: f64,
}

/// A generated proposal attached to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub generated_at: DateTime<Utc>,
    pub margin_percent: f64,
    pub items: Vec<PricedItem>,
    pub total_value: f64,
    /// Opaque reference to the rendered artifact.
    pub artifact_ref: String,
}

impl Proposal {
    pub fn download_url(&self) -> String {
        format!("{}/{}", DOWNLOAD_PATH_PREFIX, self.artifact_ref)
    }
}

/// Represents a tender-processing task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub status: TaskStatus,
    pub source_filename: String,
    pub created_at: DateTime<Utc>,
    pub matches: Vec<Match>,
    pub pricing: Option<Proposal>,
}

impl Task {
    /// Generates a fresh task identifier.
    pub fn generate_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Creates a matched task from the matching engine's output.
    pub fn matched(
        id: impl Into<String>,
        source_filename: impl Into<String>,
        matches: Vec<Match>,
    ) -> Self {
        Self {
            id: id.into(),
            status: TaskStatus::Matched,
            source_filename: source_filename.into(),
            created_at: Utc::now(),
            matches,
            pricing: None,
        }
    }

    /// Returns the match at `index`, or `None` when the index is negative or
    /// out of range.
    pub fn match_mut(&mut self, index: i64) -> Option<&mut Match> {
        let index = usize::try_from(index).ok()?;
        self.matches.get_mut(index)
    }

    /// Attaches a proposal, replacing any earlier one, and advances the
    /// status to `priced`.
    pub fn apply_proposal(&mut self, proposal: Proposal) {
        self.pricing = Some(proposal);
        self.advance_to(TaskStatus::Priced);
    }

    fn advance_to(&mut self, status: TaskStatus) {
        self.status = self.status.max(status);
    }
}

/// Request payload for validating a match.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ValidateMatchRequest {
    #[serde(alias = "match_index")]
    pub match_index: i64,

    /// Accepted for compatibility; validation is recorded regardless.
    pub approved: bool,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// Response payload for a successful validation.
#[derive(Debug, Clone, Serialize)]
pub struct ValidateMatchResponse {
    pub status: String,
}

impl ValidateMatchResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

/// Request payload for generating a proposal.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateProposalRequest {
    #[serde(alias = "margin_percent")]
    pub margin_percent: f64,
}

/// Response payload for proposal operations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    pub generated_at: DateTime<Utc>,
    pub margin_percent: f64,
    pub items: Vec<PricedItem>,
    pub total_value: f64,
    pub artifact_ref: String,
    pub download_url: String,
}

impl From<Proposal> for ProposalResponse {
    fn from(p: Proposal) -> Self {
        let download_url = p.download_url();
        Self {
            generated_at: p.generated_at,
            margin_percent: p.margin_percent,
            items: p.items,
            total_value: p.total_value,
            artifact_ref: p.artifact_ref,
            download_url,
        }
    }
}

/// Response payload for task operations.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: String,
    pub task_id: String,
    pub status: TaskStatus,
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub matches: Vec<Match>,
    pub pricing: Option<ProposalResponse>,
}

impl From<Task> for TaskResponse {
    fn from(t: Task) -> Self {
        Self {
            task_id: t.id.clone(),
            id: t.id,
            status: t.status,
            filename: t.source_filename,
            created_at: t.created_at,
            matches: t.matches,
            pricing: t.pricing.map(Into::into),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        Task::matched(
            "task-1",
            "tender.pdf",
            vec![
                Match::new("P-101", "Centrifugal Pump").with_confidence(0.92),
                Match::new("V-305", "Control Valve").with_confidence(0.74),
            ],
        )
    }

    fn sample_proposal() -> Proposal {
        Proposal {
            generated_at: Utc::now(),
            margin_percent: 20.0,
            items: vec![PricedItem {
                sku: "P-101".to_string(),
                description: "Centrifugal Pump".to_string(),
                base_cost: 1000.0,
                sell_price: 1200.0,
            }],
            total_value: 1200.0,
            artifact_ref: "Proposal_task-1_20240115.txt".to_string(),
        }
    }

    #[test]
    fn test_task_status_serialization() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Matched).unwrap(),
            "\"matched\""
        );
        assert_eq!(
            serde_json::to_string(&TaskStatus::Priced).unwrap(),
            "\"priced\""
        );
        let status: TaskStatus = serde_json::from_str("\"validated\"").unwrap();
        assert_eq!(status, TaskStatus::Validated);
    }

    #[test]
    fn test_task_status_from_str() {
        assert_eq!("created".parse::<TaskStatus>(), Ok(TaskStatus::Created));
        assert_eq!("priced".parse::<TaskStatus>(), Ok(TaskStatus::Priced));
        assert!("specmatch_completed".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_task_status_ordering() {
        assert!(TaskStatus::Created < TaskStatus::Matched);
        assert!(TaskStatus::Matched < TaskStatus::Validated);
        assert!(TaskStatus::Validated < TaskStatus::Priced);
    }

    #[test]
    fn test_new_task_is_matched_without_pricing() {
        let task = sample_task();
        assert_eq!(task.status, TaskStatus::Matched);
        assert_eq!(task.matches.len(), 2);
        assert!(task.pricing.is_none());
    }

    #[test]
    fn test_generate_id_is_unique() {
        assert_ne!(Task::generate_id(), Task::generate_id());
    }

    #[test]
    fn test_match_mut_bounds() {
        let mut task = sample_task();
        assert!(task.match_mut(0).is_some());
        assert!(task.match_mut(1).is_some());
        assert!(task.match_mut(2).is_none());
        assert!(task.match_mut(-1).is_none());
    }

    #[test]
    fn test_mark_validated_default_note() {
        let mut m = Match::new("P-101", "Centrifugal Pump");
        m.mark_validated(None);
        assert!(m.validated);
        assert_eq!(m.validation_note.as_deref(), Some(DEFAULT_VALIDATION_NOTE));
    }

    #[test]
    fn test_mark_validated_with_note() {
        let mut m = Match::new("P-101", "Centrifugal Pump");
        m.mark_validated(Some("Checked against datasheet".to_string()));
        assert_eq!(
            m.validation_note.as_deref(),
            Some("Checked against datasheet")
        );
    }

    #[test]
    fn test_apply_proposal_advances_status() {
        let mut task = sample_task();
        task.apply_proposal(sample_proposal());
        assert_eq!(task.status, TaskStatus::Priced);
        assert!(task.pricing.is_some());
    }

    #[test]
    fn test_apply_proposal_overwrites_previous() {
        let mut task = sample_task();
        task.apply_proposal(sample_proposal());

        let mut second = sample_proposal();
        second.margin_percent = 35.0;
        task.apply_proposal(second);

        assert_eq!(task.pricing.as_ref().unwrap().margin_percent, 35.0);
        assert_eq!(task.status, TaskStatus::Priced);
    }

    #[test]
    fn test_match_serialization_skips_empty_optionals() {
        let m = Match::new("V-305", "Control Valve");
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["sku"], "V-305");
        assert_eq!(json["validated"], false);
        assert!(json.get("validationNote").is_none());
        assert!(json.get("reason").is_none());
    }

    #[test]
    fn test_match_deserialization_defaults() {
        let m: Match = serde_json::from_str(r#"{"sku":"X-1","name":"Gasket"}"#).unwrap();
        assert!(!m.validated);
        assert_eq!(m.confidence, 0.0);
        assert!(m.validation_note.is_none());
    }

    #[test]
    fn test_task_json_round_trip() {
        let mut task = sample_task();
        task.matches[0].mark_validated(Some("ok".to_string()));
        task.apply_proposal(sample_proposal());

        let json = serde_json::to_string(&task).unwrap();
        let parsed: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, task);
    }

    #[test]
    fn test_validate_request_accepts_both_casings() {
        let camel: ValidateMatchRequest =
            serde_json::from_str(r#"{"matchIndex":1,"approved":false}"#).unwrap();
        assert_eq!(camel.match_index, 1);
        assert!(!camel.approved);
        assert!(camel.notes.is_none());

        let snake: ValidateMatchRequest =
            serde_json::from_str(r#"{"match_index":0,"approved":true,"notes":"fine"}"#).unwrap();
        assert_eq!(snake.match_index, 0);
        assert_eq!(snake.notes.as_deref(), Some("fine"));
    }

    #[test]
    fn test_validate_request_notes_length() {
        let request = ValidateMatchRequest {
            match_index: 0,
            approved: true,
            notes: Some("x".repeat(2001)),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_generate_proposal_request_casings() {
        let camel: GenerateProposalRequest =
            serde_json::from_str(r#"{"marginPercent":20}"#).unwrap();
        assert_eq!(camel.margin_percent, 20.0);
        let snake: GenerateProposalRequest =
            serde_json::from_str(r#"{"margin_percent":-5.5}"#).unwrap();
        assert_eq!(snake.margin_percent, -5.5);
    }

    #[test]
    fn test_task_response_from_task() {
        let mut task = sample_task();
        task.apply_proposal(sample_proposal());
        let response: TaskResponse = task.into();

        assert_eq!(response.id, "task-1");
        assert_eq!(response.task_id, "task-1");
        assert_eq!(response.filename, "tender.pdf");
        let pricing = response.pricing.unwrap();
        assert_eq!(
            pricing.download_url,
            "/export/download/Proposal_task-1_20240115.txt"
        );
    }

    #[test]
    fn test_task_response_serializes_null_pricing() {
        let response: TaskResponse = sample_task().into();
        let json = serde_json::to_value(&response).unwrap();
        assert!(json["pricing"].is_null());
        assert_eq!(json["status"], "matched");
        assert_eq!(json["taskId"], "task-1");
        assert!(json["createdAt"].is_string());
    }
}
