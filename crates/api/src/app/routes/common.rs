//! Handlers and wiring shared by every sub-application.

use std::sync::Arc;

use axum::{
    Extension, Json, Router,
    extract::{
        Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};

use gatehouse_auth::{
    Capability, CapabilityRequirement, CredentialStore, Identity, explain as explain_decision,
};

use crate::app::dto::{ExplainQuery, LoginRequest, LoginResponse};
use crate::app::errors;
use crate::app::services::SubApp;
use crate::context::CallerContext;
use crate::middleware::{GuardState, guard_middleware};

/// Install the sub-application's guard on every route of `routes`.
pub fn guarded<C: Capability>(routes: Router, app: &SubApp<C>) -> Router {
    let state = GuardState {
        guard: app.guard.clone(),
    };

    routes
        .route_layer(axum::middleware::from_fn_with_state(state, guard_middleware::<C>))
        .layer(Extension(app.store.clone()))
}

/// `{message, data}` body used by the demo handlers.
pub fn ok(message: &str, data: Value) -> Json<Value> {
    Json(json!({ "message": message, "data": data }))
}

pub async fn login<C: Capability>(
    Extension(store): Extension<Arc<CredentialStore<C>>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return errors::json_error(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match store.login(&body.username, &body.password) {
        Some(issued) => (
            StatusCode::OK,
            Json(LoginResponse {
                message: "Login successful".to_string(),
                token: issued.token,
                identity: issued.identity,
            }),
        )
            .into_response(),
        None => errors::invalid_credentials(),
    }
}

/// Public endpoint; reports whether an identity was attached (it never is).
pub async fn public_info<C: Capability>(
    caller: Option<Extension<CallerContext<C>>>,
) -> Json<Value> {
    Json(json!({
        "message": "This endpoint is public",
        "model": C::MODEL,
        "authenticated": caller.is_some(),
    }))
}

pub async fn me<C: Capability>(
    Extension(caller): Extension<CallerContext<C>>,
) -> Json<Identity<C>> {
    Json(caller.identity().clone())
}

/// Explain the caller's own access to `?capability=a,b`.
pub async fn explain<C: Capability>(
    Extension(caller): Extension<CallerContext<C>>,
    query: Result<Query<ExplainQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return errors::json_error(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let required = match query.tokens().map(str::parse::<C>).collect::<Result<Vec<_>, _>>() {
        Ok(required) if !required.is_empty() => required,
        Ok(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "capability must name at least one token",
            );
        }
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, e.to_string()),
    };

    let explanation = explain_decision(caller.identity(), &CapabilityRequirement::new(required));

    Json(json!({
        "subjectId": caller.subject_id(),
        "explanation": explanation,
    }))
    .into_response()
}
