//! Module permission sub-application (ALL match) over `users`, `orders`, `reports`.

use axum::{
    Extension, Json, Router,
    extract::Path,
    routing::{get, post},
};
use serde_json::{Value, json};

use gatehouse_auth::{ModulePermission, RegistryError, RouteAccess, RouteRegistry};

use crate::app::routes::common;
use crate::app::services::SubApp;
use crate::context::CallerContext;

fn require(tokens: &[&str]) -> Result<RouteAccess<ModulePermission>, RegistryError> {
    let required = tokens
        .iter()
        .map(|t| t.parse::<ModulePermission>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| RegistryError::InvalidRequirement(e.to_string()))?;
    Ok(RouteAccess::require(required))
}

pub fn registry() -> Result<RouteRegistry<ModulePermission>, RegistryError> {
    RouteRegistry::builder()
        .route("POST", "/modules/auth/login", RouteAccess::public())
        .route("GET", "/modules/public", RouteAccess::public())
        .route("GET", "/modules/explain", RouteAccess::authenticated())
        .route("GET", "/modules/users", require(&["users:list"])?)
        .route("POST", "/modules/users", require(&["users:create"])?)
        .route("GET", "/modules/users/:id", require(&["users:read"])?)
        .route("DELETE", "/modules/users/:id", require(&["users:delete"])?)
        .route("GET", "/modules/orders", require(&["orders:list"])?)
        .route("GET", "/modules/orders/:id", require(&["orders:read"])?)
        .route("POST", "/modules/orders/:id/refund", require(&["orders:refund"])?)
        .route(
            "GET",
            "/modules/reports/sales",
            require(&["reports:view", "orders:list"])?,
        )
        .build()
}

pub fn router(app: &SubApp<ModulePermission>) -> Router {
    let routes = Router::new()
        .route("/modules/auth/login", post(common::login::<ModulePermission>))
        .route("/modules/public", get(common::public_info::<ModulePermission>))
        .route("/modules/me", get(common::me::<ModulePermission>))
        .route("/modules/explain", get(common::explain::<ModulePermission>))
        .route("/modules/users", get(list_users).post(create_user))
        .route("/modules/users/:id", get(get_user).delete(delete_user))
        .route("/modules/orders", get(list_orders))
        .route("/modules/orders/:id", get(get_order))
        .route("/modules/orders/:id/refund", post(refund_order))
        .route("/modules/reports/sales", get(sales_report));

    common::guarded(routes, app)
}

pub async fn list_users() -> Json<Value> {
    common::ok("Users retrieved", json!([{ "id": "1" }, { "id": "2" }]))
}

pub async fn create_user(
    Extension(caller): Extension<CallerContext<ModulePermission>>,
) -> Json<Value> {
    common::ok(
        "User created",
        json!({ "id": "3", "createdBy": caller.subject_id() }),
    )
}

pub async fn get_user(Path(id): Path<String>) -> Json<Value> {
    common::ok("User retrieved", json!({ "id": id }))
}

pub async fn delete_user(Path(id): Path<String>) -> Json<Value> {
    common::ok("User deleted", json!({ "id": id }))
}

pub async fn list_orders() -> Json<Value> {
    common::ok("Orders retrieved", json!([{ "id": "100" }, { "id": "101" }]))
}

pub async fn get_order(Path(id): Path<String>) -> Json<Value> {
    common::ok("Order retrieved", json!({ "id": id }))
}

pub async fn refund_order(
    Extension(caller): Extension<CallerContext<ModulePermission>>,
    Path(id): Path<String>,
) -> Json<Value> {
    tracing::info!(order_id = %id, subject_id = %caller.subject_id(), "order refunded");
    common::ok("Order refunded", json!({ "id": id, "refunded": true }))
}

pub async fn sales_report() -> Json<Value> {
    common::ok("Sales report", json!({ "orders": 2, "total": 150.0 }))
}
