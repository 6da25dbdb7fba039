use axum::{Extension, Json};
use serde_json::{Value, json};

use crate::context::RequestContext;

pub async fn health(Extension(ctx): Extension<RequestContext>) -> Json<Value> {
    Json(json!({ "status": "ok", "requestId": ctx.request_id().to_string() }))
}
