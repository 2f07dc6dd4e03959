pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod rules;
pub mod services;
pub mod state;
pub mod types;

#[cfg(test)]
pub mod testing;

use axum::{
    http::HeaderValue,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Full application router with global middleware
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(public_routes())
        .merge(registration_routes())
        .merge(protected_routes())
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public::{auth, landing};

    Router::new()
        .route("/", get(landing::root).post(landing::capture_email))
        .route("/health", get(landing::health))
        .route("/auth/register", get(auth::register_get).post(auth::register_post))
        .route("/auth/login/", post(auth::login_post))
        .route("/auth/logout/", get(auth::logout_get))
}

fn registration_routes() -> Router<AppState> {
    use handlers::public::auth;

    Router::new()
        .route("/auth/details/", get(auth::details_get).post(auth::details_post))
        .route_layer(from_fn(middleware::registration_auth_middleware))
}

fn protected_routes() -> Router<AppState> {
    use handlers::protected::{admin, answer, ask, redeem, views};

    Router::new()
        .route("/ask/", get(ask::ask_get).post(ask::ask_post))
        .route("/ask/:survey_id", get(ask::survey_get).post(ask::question_post))
        // both answer routes share one parameter name at this segment
        .route("/answer/:target/", get(answer::browse_get))
        .route("/answer/:target", get(answer::form_get).post(answer::form_post))
        .route("/redeem/", get(redeem::redeem_get))
        .route("/redeem/:channel/", get(redeem::channel_get).post(redeem::channel_post))
        .route("/admin/tables", get(admin::tables_get))
        .route("/home/", get(views::home_get))
        .route("/profile/", get(views::profile_get))
        .route("/challenge/:id", get(views::challenge_claim).post(views::challenge_claim))
        .route("/results/:survey_id", get(views::results_get))
        .route("/export/:survey_id", get(views::export_get))
        .route_layer(from_fn(middleware::session_auth_middleware))
}

fn cors_layer() -> CorsLayer {
    let security = &config::config().security;
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if crate::is_development!() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
