//! Error types for examsched-web

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use examsched_common::Error as CommonError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Matcher, schedule or loader failure
    #[error("Schedule error: {0}")]
    Common(#[from] CommonError),

    /// Blocking task panicked or was cancelled
    #[error("Task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_code = match &self {
            ApiError::Common(CommonError::ScheduleFormat(_))
            | ApiError::Common(CommonError::EmptyCandidateSet) => "SCHEDULE_ERROR",
            ApiError::Common(CommonError::Config(_)) => "CONFIG_ERROR",
            ApiError::Common(_) => "SOURCE_ERROR",
            ApiError::Join(_) => "INTERNAL_ERROR",
        };

        error!("Request failed: {}", self);

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
