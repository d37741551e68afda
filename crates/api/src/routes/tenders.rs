//! Tender upload endpoint handler.

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    Json,
};
use domain::models::TaskResponse;
use shared::validation::validate_upload_filename;
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_task_ingested;

/// Multipart field carrying the tender document.
pub const UPLOAD_FIELD: &str = "file";

/// Upload a tender document and run matching on it.
///
/// POST /tenders/upload
pub async fn upload_tender(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TaskResponse>, ApiError> {
    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::Validation("Uploaded file has no filename".to_string()))?;
        let data = field.bytes().await?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) = upload.ok_or_else(|| {
        ApiError::Validation(format!("Missing multipart field '{}'", UPLOAD_FIELD))
    })?;
    validate_upload_filename(&filename)?;

    info!(filename = %filename, bytes = data.len(), "Tender upload received");

    let task = state.tasks.ingest(&filename, &data).await?;
    record_task_ingested(task.matches.len());

    Ok(Json(task.into()))
}
