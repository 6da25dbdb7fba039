use axum::{
    extract::{MatchedPath, Request, State},
    http::{HeaderValue, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;

use gatehouse_auth::{Capability, GuardChain, RouteKey};
use gatehouse_core::RequestId;

use crate::app::errors;
use crate::context::{CallerContext, RequestContext};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// State for [`guard_middleware`]: the guard chain of one route tree.
#[derive(Clone)]
pub struct GuardState<C: Capability> {
    pub guard: GuardChain<C>,
}

/// Runs the guard chain for the matched route before the handler.
///
/// Must be installed with `route_layer` so the matched path template is
/// available; the registry is keyed by method + template, not the raw URI.
pub async fn guard_middleware<C: Capability>(
    State(state): State<GuardState<C>>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = match req.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_owned(),
        None => req.uri().path().to_owned(),
    };
    let key = RouteKey::new(req.method().as_str(), path);

    let authorization = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    match state.guard.check(&key, authorization) {
        Ok(Some(identity)) => {
            req.extensions_mut().insert(CallerContext::new(identity));
            next.run(req).await
        }
        Ok(None) => next.run(req).await,
        Err(e) => errors::guard_error_response(&e),
    }
}

/// Assigns a request id, runs the request inside a span, and echoes the id.
pub async fn request_context(mut req: Request, next: Next) -> Response {
    let request_id = RequestId::new();
    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    req.extensions_mut().insert(RequestContext::new(request_id));

    let mut response = next.run(req).instrument(span.clone()).await;

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    span.in_scope(|| tracing::info!(status = response.status().as_u16(), "request completed"));
    response
}
