use std::collections::HashMap;

use crate::auth::{JwtError, PasswordError};
use crate::rules::Ineligible;

/// Failures raised by the service layer
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Ineligible(#[from] Ineligible),

    #[error("{message}")]
    Validation {
        message: String,
        field_errors: HashMap<String, String>,
    },

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Export failed: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),
}

impl ServiceError {
    pub fn validation(message: impl Into<String>, field_errors: HashMap<String, String>) -> Self {
        ServiceError::Validation {
            message: message.into(),
            field_errors,
        }
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        ServiceError::NotFound(what.into())
    }

    /// True for unique-constraint violations, used to turn insert races into conflicts
    pub fn is_unique_violation(err: &sqlx::Error) -> bool {
        matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
    }
}
