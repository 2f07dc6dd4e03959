// handlers/mod.rs - Route handlers by access tier
//
// public:    no token, or the pending/registration tokens of the sign-up flow
// protected: session token required, see session_auth_middleware

pub mod protected;
pub mod public;

use serde::Serialize;

use crate::auth::{generate_jwt, Claims};
use crate::database::models::Panelist;
use crate::error::ApiError;

/// Token handed back by every step that establishes or advances a session
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub scope: crate::auth::Scope,
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panelist: Option<Panelist>,
}

impl TokenResponse {
    pub fn issue(claims: Claims, panelist: Option<Panelist>) -> Result<Self, ApiError> {
        Ok(Self {
            token: generate_jwt(&claims)?,
            scope: claims.scope,
            expires_in: claims.expires_in(),
            panelist,
        })
    }
}
