//! Error types for Bookshelf server

use std::fmt;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::book::BookViolation;

/// Operation a failure happened in, used to phrase client-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookAction {
    Add,
    Update,
    Delete,
}

impl fmt::Display for BookAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self {
            BookAction::Add => "add",
            BookAction::Update => "update",
            BookAction::Delete => "delete",
        };
        f.write_str(verb)
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to {action} book. {violation}")]
    Validation {
        action: BookAction,
        violation: BookViolation,
    },

    #[error("{0}")]
    NotFound(String),

    /// A freshly created record could not be found afterwards
    #[error("Failed to add book")]
    Persistence(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// `fail` for client errors, `error` for server errors
    pub status: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (kind, message) = match &self {
            AppError::Persistence(detail) => {
                tracing::error!("Persistence error: {}", detail);
                ("error", self.to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("error", "Internal server error".to_string())
            }
            _ => ("fail", self.to_string()),
        };

        let body = Json(ErrorResponse {
            status: kind.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
