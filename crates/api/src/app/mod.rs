//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store, location client and alert sink wiring
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses
//! - `extract.rs`: JSON body extractor with JSON rejections

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use equipstock_infra::AppConfig;

pub mod dto;
pub mod errors;
pub mod extract;
pub mod routes;
pub mod services;

pub use services::{AppServices, BootstrapError};

/// Build the full HTTP router from configuration (entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> Result<Router, BootstrapError> {
    let services = services::build_services(config).await?;
    Ok(router(services))
}

/// Router over already-wired services.
pub fn router(services: AppServices) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(Extension(Arc::new(services)))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
