use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::auth::handlers::auth_handler;
use crate::features::auth::services::AuthService;

/// Public auth routes (no authentication required)
pub fn public_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/register", post(auth_handler::register))
        .route("/login", post(auth_handler::login))
        .with_state(service)
}

/// Protected auth routes (require bearer authentication)
pub fn protected_routes(service: Arc<AuthService>) -> Router {
    Router::new()
        .route("/users/me", get(auth_handler::get_me))
        .with_state(service)
}
