//! Route definitions for the Authgate API
//!
//! This module organizes all API routes and applies middleware.

use crate::state::AppState;
use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

mod auth;
mod health;
mod users;


pub use auth::auth_routes;
pub use users::user_routes;

/// Liveness text served at `/`
pub const ROOT_MESSAGE: &str = "Server is running";

/// Create the main application router with all middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { ROOT_MESSAGE }))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .merge(auth::auth_routes())
        .merge(users::user_routes(state.clone()))
        // Apply middleware layers
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
