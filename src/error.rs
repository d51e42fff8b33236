// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Every failure crossing the HTTP boundary is rendered as a JSON object
//! whose `error` field is a human-readable reason the frontend can show
//! inline, e.g. `{"error": "Not authenticated", "code": "unauthorized"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-field validation messages, keyed by form field name.
pub type FieldErrors = BTreeMap<String, String>;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not authenticated")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid form input")]
    Validation(FieldErrors),

    #[error("{0}")]
    NotFound(String),

    /// The target is already in the requested state (lost toggle race).
    #[error("{0}")]
    Conflict(String),

    /// The identity provider rejected the request (bad credentials, etc.).
    #[error("{0}")]
    IdentityRejected(String),

    #[error("Identity provider error: {0}")]
    Identity(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Error message for an empty comment body.
    pub const EMPTY_COMMENT: &'static str = "Comment cannot be empty";

    /// Machine-readable code sent alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "unauthorized",
            AppError::BadRequest(_) => "bad_request",
            AppError::Validation(_) => "validation_failed",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::IdentityRejected(_) => "identity_rejected",
            AppError::Identity(_) => "identity_error",
            AppError::Database(_) => "database_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::IdentityRejected(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Identity(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field_errors: Option<FieldErrors>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (error, field_errors) = match self {
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                ("Something went wrong, please try again".to_string(), None)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ("Something went wrong, please try again".to_string(), None)
            }
            AppError::Identity(msg) => {
                tracing::warn!(error = %msg, "Identity provider error");
                ("Authentication service unavailable".to_string(), None)
            }
            AppError::Validation(fields) => ("Invalid form input".to_string(), Some(fields)),
            other => (other.to_string(), None),
        };

        let body = ErrorResponse {
            error,
            code,
            field_errors,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_unauthorized_body() {
        let (status, body) = body_json(AppError::Unauthorized).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Not authenticated");
        assert_eq!(body["code"], "unauthorized");
        assert!(body.get("field_errors").is_none());
    }

    #[tokio::test]
    async fn test_database_error_is_not_leaked() {
        let (status, body) =
            body_json(AppError::Database("connection reset by peer".to_string())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_validation_carries_field_errors() {
        let mut fields = FieldErrors::new();
        fields.insert("email".to_string(), "Please enter a valid email address.".to_string());

        let (status, body) = body_json(AppError::Validation(fields)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["field_errors"]["email"],
            "Please enter a valid email address."
        );
    }

    #[test]
    fn test_conflict_status() {
        let err = AppError::Conflict("Already liked".to_string());
        assert_eq!(err.status(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "Already liked");
    }
}
