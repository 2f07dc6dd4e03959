use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config;

/// What a token is allowed to do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    /// Email captured on the landing page, pre-fills registration
    Pending,
    /// Issued after registration, only valid for the details step
    Registration,
    /// Logged-in panelist
    Session,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// panelist_id; absent for pending tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<i32>,
    pub email: String,
    pub scope: Scope,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(scope: Scope, panelist_id: Option<i32>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        let security = &config::config().security;
        let lifetime = match scope {
            Scope::Session => Duration::hours(security.session_expiry_hours as i64),
            Scope::Pending | Scope::Registration => {
                Duration::minutes(security.registration_expiry_minutes as i64)
            }
        };

        Self {
            sub: panelist_id,
            email: email.into(),
            scope,
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        }
    }

    pub fn session(panelist_id: i32, email: impl Into<String>) -> Self {
        Self::new(Scope::Session, Some(panelist_id), email)
    }

    pub fn expires_in(&self) -> i64 {
        self.exp - self.iat
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),
    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
    #[error("Token is not valid for this operation")]
    WrongScope,
    #[error("Invalid JWT secret")]
    InvalidSecret,
}

fn secret() -> Result<&'static str, JwtError> {
    let secret = config::config().security.jwt_secret.as_str();
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }
    Ok(secret)
}

pub fn generate_jwt(claims: &Claims) -> Result<String, JwtError> {
    let encoding_key = EncodingKey::from_secret(secret()?.as_bytes());

    encode(&Header::default(), claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry, then require the expected scope
pub fn validate_jwt(token: &str, scope: Scope) -> Result<Claims, JwtError> {
    let decoding_key = DecodingKey::from_secret(secret()?.as_bytes());

    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    if token_data.claims.scope != scope {
        return Err(JwtError::WrongScope);
    }
    Ok(token_data.claims)
}

#[derive(Debug, thiserror::Error)]
#[error("Password hashing failed: {0}")]
pub struct PasswordError(#[from] bcrypt::BcryptError);

pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(password, config::config().security.bcrypt_cost)?)
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    Ok(bcrypt::verify(password, hash)?)
}
