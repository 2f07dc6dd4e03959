use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::{validate_jwt, Scope};
use crate::error::ApiError;

/// Logged-in panelist, injected by `session_auth_middleware`
#[derive(Clone, Debug)]
pub struct CurrentPanelist {
    pub panelist_id: i32,
}

/// Freshly registered panelist, injected by `registration_auth_middleware`
#[derive(Clone, Debug)]
pub struct RegistrationSession {
    pub panelist_id: i32,
}

/// Requires a session-scoped bearer token
pub async fn session_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let panelist_id = authenticate(&headers, Scope::Session)?;
    request.extensions_mut().insert(CurrentPanelist { panelist_id });

    Ok(next.run(request).await)
}

/// Requires a registration-scoped bearer token; only the details step accepts it
pub async fn registration_auth_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let panelist_id = authenticate(&headers, Scope::Registration)?;
    request.extensions_mut().insert(RegistrationSession { panelist_id });

    Ok(next.run(request).await)
}

/// Panelist id carried by a valid bearer token of `scope`
fn authenticate(headers: &HeaderMap, scope: Scope) -> Result<i32, ApiError> {
    let token = extract_bearer(headers).map_err(ApiError::unauthorized)?;
    let claims = validate_jwt(&token, scope).map_err(|e| {
        tracing::debug!("Rejected {:?} token: {}", scope, e);
        ApiError::from(e)
    })?;
    claims
        .sub
        .ok_or_else(|| ApiError::unauthorized("Token does not identify a panelist"))
}

/// Extract a bearer token from the Authorization header
pub fn extract_bearer(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty JWT token".to_string());
        }
        Ok(token.trim().to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
