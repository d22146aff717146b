//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// Pipeline stage failures are recorded on the task record; these variants
/// also double as HTTP responses for the request handlers.
#[derive(Error, Debug)]
pub enum AppError {
    /// Task with the given ID was not found (never written into task state)
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// Model call or schema validation failed, even after the repair attempt
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Search or content-fetch collaborator failed
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    /// Embedding collaborator failed for a query
    ///
    /// Per-chunk embedding failures are recoverable and never surface here;
    /// only the query-embedding case aborts a filter pass.
    #[error("Embedding failed: {0}")]
    Embedding(String),

    /// Request body is invalid (e.g., empty topic)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::TaskNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Generation(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::Retrieval(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::Embedding(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_not_found_maps_to_404() {
        let response = AppError::TaskNotFound("abc".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_generation_maps_to_500() {
        let response = AppError::Generation("schema violation".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_message_is_preserved() {
        let err = AppError::Retrieval("search API returned 503".to_string());
        assert_eq!(err.to_string(), "Retrieval failed: search API returned 503");
    }
}
