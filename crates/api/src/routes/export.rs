//! Proposal artifact download handler.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use shared::validation::validate_download_filename;

use crate::app::AppState;
use crate::error::ApiError;

/// Download a rendered proposal.
///
/// GET /export/download/:filename
pub async fn download_artifact(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    validate_download_filename(&filename)?;

    let bytes = state
        .tasks
        .open_artifact(&filename)
        .await?
        .ok_or_else(|| ApiError::NotFound("File not found".to_string()))?;

    let disposition = format!("attachment; filename=\"{}\"", filename.replace('"', ""));
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
