// handlers/public/auth/session.rs - POST /auth/login/, GET /auth/logout/

use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Claims;
use crate::handlers::TokenResponse;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login_post(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let Json(input) = payload?;
    let panelist = state.panelists().authenticate(&input.email, &input.password).await?;

    let claims = Claims::session(panelist.panelist_id, panelist.email.clone());
    Ok(ApiResponse::success(TokenResponse::issue(claims, Some(panelist))?))
}

/// Tokens are stateless; the client discards its copy
pub async fn logout_get() -> ApiResult<Value> {
    Ok(ApiResponse::success(json!({
        "logged_out": true,
        "message": "Discard the session token to finish logging out"
    })))
}
