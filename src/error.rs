//! Application error types and HTTP response mapping.
//!
//! `AppError` covers every failure the browsing engine can surface. The
//! engine itself never builds responses; the `IntoResponse` impl lets the
//! route handlers return engine results directly.
//!
//! Error mappings:
//! - `NotFound` → 404
//! - `InvalidState` → 409
//! - `Timeout` → 504
//! - `Git`, `Io`, `Backend`, `Internal` → 500

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// A ref, path, commit or cursor could not be resolved.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The resolved object is of the wrong kind for the operation.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A bounded subprocess exceeded its time limit.
    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backend failure: {0}")]
    Backend(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidState(_) => StatusCode::CONFLICT,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Git(_) | AppError::Io(_) | AppError::Backend(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::InvalidState("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(AppError::Timeout("x".into()).status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            AppError::Backend("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
