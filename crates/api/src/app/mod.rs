//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: per-model credential store, requirement table and guard chain
//! - `directory.rs`: demo users and static tokens
//! - `routes/`: one file per sub-application, each declaring its requirement table
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use axum::Router;
use tower::ServiceBuilder;

use crate::config::ApiConfig;
use crate::middleware;

pub mod directory;
pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config)?;
    services.log_requirement_tables();

    Ok(routes::router(&services).layer(
        ServiceBuilder::new().layer(axum::middleware::from_fn(middleware::request_context)),
    ))
}
