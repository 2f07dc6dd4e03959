// HTTP API Error Types
use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::auth::{JwtError, PasswordError};
use crate::database::manager::DatabaseError;
use crate::services::ServiceError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::ValidationError { .. } => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError { message, field_errors } => {
                let mut response = json!({
                    "error": true,
                    "message": message,
                    "code": "VALIDATION_ERROR"
                });

                if let Some(field_errors) = field_errors {
                    response["field_errors"] = json!(field_errors);
                }

                response
            }
            _ => {
                json!({
                    "error": true,
                    "message": self.message(),
                    "code": self.error_code()
                })
            }
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation_error(message: impl Into<String>, field_errors: Option<HashMap<String, String>>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Sqlx(sqlx_err) => sqlx_err.into(),
            misconfigured => {
                tracing::error!("Database misconfigured: {}", misconfigured);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::not_found("Record not found"),
            unavailable @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)) => {
                tracing::error!("Database connection error: {}", unavailable);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            other => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", other);
                ApiError::internal_server_error("Database error occurred")
            }
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            rejected @ (JwtError::InvalidToken(_) | JwtError::WrongScope) => {
                ApiError::unauthorized(rejected.to_string())
            }
            signing => {
                tracing::error!("Token signing failed: {}", signing);
                ApiError::internal_server_error("Unable to issue session")
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        tracing::error!("{}", err);
        ApiError::internal_server_error("Unable to process credentials")
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => e.into(),
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::Conflict(msg) => ApiError::conflict(msg),
            ServiceError::Unauthorized(msg) => ApiError::unauthorized(msg),
            ServiceError::Forbidden(msg) => ApiError::forbidden(msg),
            ServiceError::Ineligible(reason) => ApiError::forbidden(reason.to_string()),
            ServiceError::Validation { message, field_errors } => {
                let field_errors = (!field_errors.is_empty()).then_some(field_errors);
                ApiError::validation_error(message, field_errors)
            }
            ServiceError::Token(e) => e.into(),
            ServiceError::Password(e) => e.into(),
            ServiceError::Export(e) => {
                tracing::error!("Spreadsheet export failed: {}", e);
                ApiError::internal_server_error("Unable to build export")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Ineligible;

    #[test]
    fn validation_error_carries_field_errors() {
        let mut fields = HashMap::new();
        fields.insert("confirm_password".to_string(), "Passwords must match".to_string());
        let err: ApiError = ServiceError::validation("Invalid registration", fields).into();

        assert_eq!(err.status_code(), 400);
        let body = err.to_json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field_errors"]["confirm_password"], "Passwords must match");
    }

    #[test]
    fn ineligible_is_forbidden_with_reason() {
        let err: ApiError = ServiceError::Ineligible(Ineligible::AlreadyResponded).into();
        assert_eq!(err.status_code(), 403);
        assert_eq!(err.message(), "You have already answered this survey");
    }

    #[test]
    fn pool_timeout_is_unavailable() {
        let err: ApiError = sqlx::Error::PoolTimedOut.into();
        assert_eq!(err.status_code(), 503);
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert_eq!(err.status_code(), 404);
    }

    #[test]
    fn export_failure_is_internal() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let Err(xlsx) = workbook.add_worksheet().set_name("") else {
            panic!("blank sheet name accepted");
        };
        let err: ApiError = ServiceError::Export(xlsx).into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.error_code(), "INTERNAL_SERVER_ERROR");
    }
}
