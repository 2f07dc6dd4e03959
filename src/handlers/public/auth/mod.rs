// handlers/public/auth/mod.rs - Sign-up and session endpoints
//
// Flow: POST / (pending) → POST /auth/register (registration) →
// POST /auth/details/ (session). Returning panelists use POST /auth/login/.

pub mod details;
pub mod register;
pub mod session;

pub use details::{details_get, details_post};
pub use register::{register_get, register_post};
pub use session::{login_post, logout_get};
