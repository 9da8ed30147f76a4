//! HTTP error mapping: pipeline errors → status codes and JSON bodies.
//!
//! The response contract is fixed: request-shape problems are `400`,
//! conversion-stage problems are `500`, and every body is
//! `{"error": "<message>"}` with the message naming the offending upload.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::DocmergeError;

/// JSON error body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// API-level error with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A batch pipeline failure.
    #[error(transparent)]
    Pipeline(#[from] DocmergeError),

    /// The multipart request itself could not be read.
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(detail) => (StatusCode::BAD_REQUEST, detail),
            ApiError::Pipeline(err) => match &err {
                DocmergeError::NoFilesUploaded => {
                    (StatusCode::BAD_REQUEST, "No files uploaded".to_string())
                }
                DocmergeError::UnsupportedFormat { filename } => (
                    StatusCode::BAD_REQUEST,
                    format!("{filename} has unsupported format"),
                ),
                DocmergeError::StagingFailed { filename, .. }
                | DocmergeError::ConversionFailed { filename, .. }
                | DocmergeError::ConversionTimeout { filename, .. } => {
                    tracing::error!(error = %err, "conversion failed");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to convert {filename}"),
                    )
                }
                DocmergeError::ArtifactNotFound { filename, .. } => {
                    tracing::error!(error = %err, "artifact not found");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Converted PDF for {filename} not found"),
                    )
                }
                _ => {
                    tracing::error!(error = %err, "internal error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                    )
                }
            },
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
