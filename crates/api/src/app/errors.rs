//! Consistent JSON error responses: `{statusCode, message, error}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use gatehouse_auth::GuardError;

pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "statusCode": status.as_u16(),
            "message": message.into(),
            "error": status.canonical_reason().unwrap_or("Error"),
        })),
    )
        .into_response()
}

/// 401 for authentication failures, 403 for authorization failures.
///
/// 403 messages carry the required/missing capability list; 401 messages never
/// mention the route's requirement.
pub fn guard_error_response(err: &GuardError) -> Response {
    let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::FORBIDDEN);
    json_error(status, err.to_string())
}

pub fn invalid_credentials() -> Response {
    json_error(StatusCode::UNAUTHORIZED, "Invalid credentials")
}

#[cfg(test)]
mod tests {
    use gatehouse_auth::{AuthnError, AuthzError, CapabilityModel};

    use super::*;

    #[test]
    fn guard_errors_map_to_401_and_403() {
        let resp = guard_error_response(&GuardError::Authentication(AuthnError::InvalidToken));
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = guard_error_response(&GuardError::Authorization(
            AuthzError::MissingCapabilities {
                model: CapabilityModel::ActionPermission,
            },
        ));
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
