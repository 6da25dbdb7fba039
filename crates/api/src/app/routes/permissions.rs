//! Action permission sub-application (ALL match) over an `articles` resource.

use axum::{
    Extension, Json, Router,
    extract::Path,
    routing::{get, post},
};
use serde_json::{Value, json};

use gatehouse_auth::{Permission, RegistryError, RouteAccess, RouteRegistry};

use crate::app::routes::common;
use crate::app::services::SubApp;
use crate::context::CallerContext;

pub fn registry() -> Result<RouteRegistry<Permission>, RegistryError> {
    RouteRegistry::builder()
        .route("POST", "/permissions/auth/login", RouteAccess::public())
        .route("GET", "/permissions/public", RouteAccess::public())
        .route("GET", "/permissions/explain", RouteAccess::authenticated())
        .group("/permissions/articles", RouteAccess::require([Permission::READ]))
        .route(
            "POST",
            "/permissions/articles",
            RouteAccess::require([Permission::CREATE]),
        )
        .route(
            "PUT",
            "/permissions/articles/:id",
            RouteAccess::require([Permission::READ, Permission::UPDATE]),
        )
        .route(
            "DELETE",
            "/permissions/articles/:id",
            RouteAccess::require([Permission::DELETE]),
        )
        .route(
            "POST",
            "/permissions/articles/:id/publish",
            RouteAccess::require([Permission::CREATE, Permission::UPDATE]),
        )
        .build()
}

pub fn router(app: &SubApp<Permission>) -> Router {
    let routes = Router::new()
        .route("/permissions/auth/login", post(common::login::<Permission>))
        .route("/permissions/public", get(common::public_info::<Permission>))
        .route("/permissions/me", get(common::me::<Permission>))
        .route("/permissions/explain", get(common::explain::<Permission>))
        .route("/permissions/articles", get(list_articles).post(create_article))
        .route(
            "/permissions/articles/:id",
            get(get_article).put(update_article).delete(delete_article),
        )
        .route("/permissions/articles/:id/publish", post(publish_article));

    common::guarded(routes, app)
}

pub async fn list_articles() -> Json<Value> {
    common::ok(
        "Articles retrieved",
        json!([
            { "id": "1", "title": "Getting started" },
            { "id": "2", "title": "Access control" },
        ]),
    )
}

pub async fn get_article(Path(id): Path<String>) -> Json<Value> {
    common::ok("Article retrieved", json!({ "id": id }))
}

pub async fn create_article(
    Extension(caller): Extension<CallerContext<Permission>>,
) -> Json<Value> {
    common::ok(
        "Article created",
        json!({ "id": "3", "author": caller.subject_id() }),
    )
}

pub async fn update_article(Path(id): Path<String>) -> Json<Value> {
    common::ok("Article updated", json!({ "id": id }))
}

pub async fn delete_article(Path(id): Path<String>) -> Json<Value> {
    common::ok("Article deleted", json!({ "id": id }))
}

pub async fn publish_article(Path(id): Path<String>) -> Json<Value> {
    common::ok("Article published", json!({ "id": id, "published": true }))
}
