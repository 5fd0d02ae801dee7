//! Request-level error taxonomy.

use axum::http::StatusCode;
use thiserror::Error;

use crate::db::DbError;

/// Failures a handler hands back to the dispatcher.
///
/// Validation failures are not errors: handlers answer them by re-rendering
/// the originating form.
#[derive(Debug, Error)]
pub enum AppError {
    /// No route, or no row for a looked-up id.
    #[error("{0}")]
    NotFound(String),

    /// A policy or ownership check refused the request.
    #[error("{0}")]
    Unauthorized(String),

    /// The database could not be reached or a query failed.
    #[error("database failure: {0}")]
    Database(#[from] DbError),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AppError::Database(_) | AppError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the visitor.
    pub fn public_message(&self) -> String {
        match self {
            AppError::NotFound(message) | AppError::Unauthorized(message) => message.clone(),
            AppError::Database(_) | AppError::PasswordHash(_) => {
                "Something went wrong. Please try again later.".to_string()
            }
        }
    }
}
