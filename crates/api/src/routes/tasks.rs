//! Task endpoint handlers.

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    Json,
};
use domain::models::{
    GenerateProposalRequest, ListAuditEntriesQuery, ListAuditEntriesResponse, ProposalResponse,
    TaskResponse, ValidateMatchRequest, ValidateMatchResponse,
};
use shared::pagination::{decode_cursor, encode_cursor};
use shared::validation::validate_margin_percent;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::{record_match_validated, record_proposal_generated};

/// List all tasks, newest first.
///
/// GET /tasks
pub async fn list_tasks(State(state): State<AppState>) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = state.tasks.list().await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// Get a single task.
///
/// GET /tasks/:task_id
pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = state.tasks.get(&task_id).await?;
    Ok(Json(task.into()))
}

/// Mark one match of a task as validated.
///
/// POST /tasks/:task_id/validate
pub async fn validate_match(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    payload: Result<Json<ValidateMatchRequest>, JsonRejection>,
) -> Result<Json<ValidateMatchResponse>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;

    state
        .tasks
        .validate(&task_id, request.match_index, request.approved, request.notes)
        .await?;
    record_match_validated();

    info!(task_id = %task_id, match_index = request.match_index, "Validation recorded");
    Ok(Json(ValidateMatchResponse::success()))
}

/// Price the task's matches and render a proposal.
///
/// POST /tasks/:task_id/generate-proposal
pub async fn generate_proposal(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    payload: Result<Json<GenerateProposalRequest>, JsonRejection>,
) -> Result<Json<ProposalResponse>, ApiError> {
    let Json(request) = payload?;
    validate_margin_percent(request.margin_percent)?;

    let proposal = state
        .tasks
        .generate_proposal(&task_id, request.margin_percent)
        .await?;
    record_proposal_generated();

    Ok(Json(proposal.into()))
}

/// List the audit trail of a task in write order.
///
/// GET /tasks/:task_id/audit?limit=&cursor=
pub async fn list_audit_entries(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    query: Result<Query<ListAuditEntriesQuery>, QueryRejection>,
) -> Result<Json<ListAuditEntriesResponse>, ApiError> {
    let Query(query) = query?;
    let limit = query.effective_limit();

    let after_id = query
        .cursor
        .as_deref()
        .map(|cursor| decode_cursor(cursor, &task_id))
        .transpose()
        .map_err(|e| ApiError::Validation(format!("Invalid cursor: {}", e)))?;

    // One extra row tells whether another page exists
    let mut entries = state
        .tasks
        .audit_trail(&task_id, after_id, limit + 1)
        .await?;

    let next_cursor = if entries.len() > limit as usize {
        entries.truncate(limit as usize);
        entries.last().map(|last| encode_cursor(&task_id, last.id))
    } else {
        None
    };

    Ok(Json(ListAuditEntriesResponse {
        entries,
        next_cursor,
    }))
}
