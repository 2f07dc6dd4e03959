// handlers/public/landing.rs - GET /, POST /, GET /health

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{Claims, Scope};
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::handlers::TokenResponse;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::validation::validate_email_format;
use crate::state::AppState;

pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Survey Exchange",
            "version": state.version,
            "description": "Publish surveys, answer surveys for points, redeem points for rewards",
            "endpoints": {
                "landing": "POST / (email → pending token)",
                "auth": "/auth/register, /auth/details/, /auth/login/, /auth/logout/",
                "ask": "/ask/, /ask/:survey_id",
                "answer": "/answer/:sort/, /answer/:survey_id",
                "redeem": "/redeem/, /redeem/:channel/",
                "views": "/home/, /profile/, /challenge/:id, /results/:survey_id, /export/:survey_id",
                "admin": "/admin/tables",
            }
        }
    }))
}

#[derive(Debug, Deserialize)]
pub struct CaptureEmail {
    pub email: String,
}

/// POST / - remember the email typed on the landing page for the register form
pub async fn capture_email(payload: Result<Json<CaptureEmail>, JsonRejection>) -> ApiResult<TokenResponse> {
    let Json(input) = payload?;
    let email = input.email.trim();
    validate_email_format(email).map_err(|msg| {
        let mut field_errors = std::collections::HashMap::new();
        field_errors.insert("email".to_string(), msg);
        ApiError::validation_error("Invalid email", Some(field_errors))
    })?;

    let claims = Claims::new(Scope::Pending, None, email);
    Ok(ApiResponse::success(TokenResponse::issue(claims, None)?))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check(&state.pool).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "message": "Database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}
