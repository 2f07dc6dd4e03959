// handlers/public/auth/register.rs - GET/POST /auth/register

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::{validate_jwt, Claims, Scope};
use crate::handlers::TokenResponse;
use crate::middleware::{extract_bearer, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RegisterForm {
    /// Email captured on the landing page, if a pending token was sent
    pub email: Option<String>,
}

/// GET /auth/register - prefill from an optional pending token
pub async fn register_get(headers: HeaderMap) -> ApiResult<RegisterForm> {
    let email = extract_bearer(&headers)
        .ok()
        .and_then(|token| validate_jwt(&token, Scope::Pending).ok())
        .map(|claims| claims.email);

    Ok(ApiResponse::success(RegisterForm { email }))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// POST /auth/register - create the account, then hand out a token for the details step
pub async fn register_post(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<TokenResponse> {
    let Json(input) = payload?;
    let panelist = state
        .panelists()
        .register(&input.email, &input.password, &input.confirm_password)
        .await?;

    let claims = Claims::new(Scope::Registration, Some(panelist.panelist_id), panelist.email.clone());
    Ok(ApiResponse::created(TokenResponse::issue(claims, Some(panelist))?))
}
