//! Error types and error handling for the application
//!
//! This module defines custom error types that can be converted to HTTP responses.
//! All errors implement `IntoResponse` to provide consistent error formatting.

use crate::pipeline::types::Stage;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error types
///
/// All errors that can occur in the application are represented by this enum.
/// Each variant implements automatic conversion to HTTP responses via `IntoResponse`.
///
/// Inside the scheduler tick these are caught, logged, and swallowed so they
/// never terminate the polling loop. On the on-demand API paths they propagate
/// to the caller as typed JSON errors.
#[derive(Error, Debug)]
pub enum AppError {
    /// Required configuration (recipient address, target times) missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// One of the generation stages failed or returned an invalid (empty) result
    #[error("{stage} generation failed: {cause}")]
    Generation {
        /// The pipeline stage that failed
        stage: Stage,
        /// Underlying cause message
        cause: String,
    },

    /// Transport-level failure during notification delivery
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Error occurred while loading or saving persisted settings
    #[error("Settings store error: {0}")]
    Store(#[from] crate::state::StoreError),

    /// Internal server error (catch-all for unexpected errors)
    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Build a generation error for the given stage from any displayable cause
    pub fn generation(stage: Stage, cause: impl std::fmt::Display) -> Self {
        AppError::Generation {
            stage,
            cause: cause.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Configuration(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Generation { .. } => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::Delivery(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()),
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
    fn test_generation_error_names_stage() {
        let err = AppError::generation(Stage::Idea, "model returned nothing");
        let msg = err.to_string();
        assert!(msg.contains("Idea"), "message should name the stage: {}", msg);
        assert!(msg.contains("model returned nothing"));
    }

    #[test]
    fn test_configuration_error_message() {
        let err = AppError::Configuration("recipient address is empty".to_string());
        assert!(err.to_string().contains("recipient address is empty"));
    }
}
