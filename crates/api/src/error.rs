use axum::{
    extract::multipart::MultipartError,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::services::TaskServiceError;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Ingest failed: {0}")]
    IngestFailed(String),

    #[error("Render failed: {0}")]
    RenderFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Vec<ValidationDetail>>,
}

#[derive(Debug, Serialize)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "payload_too_large",
                "Uploaded document exceeds the size limit".into(),
            ),
            ApiError::IngestFailed(msg) => {
                tracing::error!("Ingest failed: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "ingest_failed",
                    "The document could not be processed".into(),
                )
            }
            ApiError::RenderFailed(msg) => {
                tracing::error!("Render failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "render_failed",
                    "The proposal document could not be written".into(),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg.clone(),
            ),
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<TaskServiceError> for ApiError {
    fn from(err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::NotFound(_) => ApiError::NotFound("Task not found".into()),
            TaskServiceError::InvalidIndex { .. } => {
                ApiError::Validation("Invalid match index".into())
            }
            TaskServiceError::IngestFailure(msg) => ApiError::IngestFailed(msg),
            TaskServiceError::PricingOverflow { .. } => {
                ApiError::Validation("Margin percent is too large to price".into())
            }
            TaskServiceError::RenderFailure(e) => ApiError::RenderFailed(e.to_string()),
            TaskServiceError::Storage(e) => ApiError::Internal(format!("Storage error: {}", e)),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<validator::ValidationError> for ApiError {
    fn from(error: validator::ValidationError) -> Self {
        let message = error
            .message
            .map(|m| m.to_string())
            .unwrap_or_else(|| error.code.to_string());
        ApiError::Validation(message)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge;
        }
        ApiError::Validation(format!("Malformed multipart body: {}", err.body_text()))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    field: field.to_string(),
                    message: e.message.clone().map(|m| m.to_string()).unwrap_or_default(),
                })
            })
            .collect();

        let message = if details.len() == 1 {
            details[0].message.clone()
        } else {
            format!("{} validation errors", details.len())
        };

        ApiError::Validation(message)
    }
}
