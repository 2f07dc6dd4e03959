pub mod auth;
pub mod response;

pub use auth::{
    extract_bearer, registration_auth_middleware, session_auth_middleware, CurrentPanelist, RegistrationSession,
};
pub use response::{ApiResponse, ApiResult, Attachment};
