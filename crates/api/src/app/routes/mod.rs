use axum::{Router, routing::get};

use crate::app::services::AppServices;

pub mod common;
pub mod modules;
pub mod permissions;
pub mod roles;
pub mod system;

/// Router for every sub-application plus the unguarded system routes.
///
/// Each sub-application carries its own guard layer, so merging keeps the
/// three capability vocabularies apart.
pub fn router(services: &AppServices) -> Router {
    Router::new()
        .route("/health", get(system::health))
        .merge(roles::router(&services.roles))
        .merge(permissions::router(&services.permissions))
        .merge(modules::router(&services.modules))
}
