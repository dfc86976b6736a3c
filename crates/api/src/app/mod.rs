//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, bus, projection, and worker wiring
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(services: Arc<AppServices>) -> Router {
    // Market routes act on behalf of the caller named in the actor header.
    let protected = routes::router().layer(axum::middleware::from_fn(middleware::actor_middleware));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::users::router())
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
