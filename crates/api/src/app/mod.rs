//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: sessions, tasks, collaborators, realtime fan-out
//! - `routes/`: HTTP routes + handlers (one file per workflow area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post},
};
use tower::ServiceBuilder;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: ApiConfig) -> Router {
    build_app_with(Arc::new(services::AppServices::simulated(&config)))
}

/// Build the router around pre-wired services.
pub fn build_app_with(services: Arc<services::AppServices>) -> Router {
    // Protected routes: require a live session.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        services.clone(),
        middleware::session_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/login", post(routes::session::login))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
