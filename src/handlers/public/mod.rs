// handlers/public/mod.rs - Landing page, health and the sign-up/login flow

pub mod auth;
pub mod landing;
