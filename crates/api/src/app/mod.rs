//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: infrastructure wiring (inventory client, order store, notification bus)
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use orderflow_infra::ServiceConfig;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: ServiceConfig) -> anyhow::Result<Router> {
    let services = services::AppServices::build(&config).await?;
    Ok(router_with(Arc::new(services)))
}

/// Router over already-built services.
pub fn router_with(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(services))
        .layer(ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::log_requests)))
}

pub use services::AppServices;
