//! Hierarchical role sub-application (ANY match).

use axum::{
    Extension, Json, Router,
    routing::{delete, get, post},
};
use serde_json::{Value, json};

use gatehouse_auth::{RegistryError, Role, RouteAccess, RouteRegistry};

use crate::app::routes::common;
use crate::app::services::SubApp;
use crate::context::CallerContext;

/// Requirement table for `/roles`.
///
/// `GET /roles/me` is not listed: unregistered routes are authenticated-only.
pub fn registry() -> Result<RouteRegistry<Role>, RegistryError> {
    RouteRegistry::builder()
        .route("POST", "/roles/auth/login", RouteAccess::public())
        .route("GET", "/roles/public", RouteAccess::public())
        .route("GET", "/roles/explain", RouteAccess::authenticated())
        .route(
            "GET",
            "/roles/reports",
            RouteAccess::require([Role::READ, Role::MANAGER, Role::ADMIN, Role::SUPER_ADMIN]),
        )
        .route(
            "GET",
            "/roles/team",
            RouteAccess::require([Role::MANAGER, Role::ADMIN, Role::SUPER_ADMIN]),
        )
        .group("/roles/admin", RouteAccess::require([Role::ADMIN, Role::SUPER_ADMIN]))
        .route(
            "DELETE",
            "/roles/admin/system/cache",
            RouteAccess::require([Role::SUPER_ADMIN]),
        )
        .build()
}

pub fn router(app: &SubApp<Role>) -> Router {
    let routes = Router::new()
        .route("/roles/auth/login", post(common::login::<Role>))
        .route("/roles/public", get(common::public_info::<Role>))
        .route("/roles/me", get(common::me::<Role>))
        .route("/roles/explain", get(common::explain::<Role>))
        .route("/roles/reports", get(reports))
        .route("/roles/team", get(team))
        .route("/roles/admin/users", get(admin_users))
        .route("/roles/admin/system/cache", delete(clear_cache));

    common::guarded(routes, app)
}

pub async fn reports(Extension(caller): Extension<CallerContext<Role>>) -> Json<Value> {
    common::ok(
        "Reports retrieved",
        json!({
            "requestedBy": caller.identity().display_name,
            "reports": ["monthly-summary", "usage"],
        }),
    )
}

pub async fn team(Extension(caller): Extension<CallerContext<Role>>) -> Json<Value> {
    common::ok(
        "Team overview",
        json!({ "managedBy": caller.subject_id(), "members": 4 }),
    )
}

pub async fn admin_users() -> Json<Value> {
    common::ok(
        "Users retrieved",
        json!([
            { "id": "user-1", "username": "reader" },
            { "id": "user-2", "username": "manager" },
        ]),
    )
}

pub async fn clear_cache(Extension(caller): Extension<CallerContext<Role>>) -> Json<Value> {
    tracing::info!(subject_id = %caller.subject_id(), "system cache cleared");
    common::ok("System cache cleared", json!({ "cleared": true }))
}
