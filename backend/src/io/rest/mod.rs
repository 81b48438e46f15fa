//! # REST API Interface Layer
//!
//! Thin HTTP translation over the domain services:
//! - JSON request/response mapping through the `shared` DTOs
//! - Domain errors translated to status codes with a `{error, code}` body
//! - Request logging on entry, failures logged with `error!`
//!
//! The acting user is read from the `X-User-Id` header and administrators
//! are marked with `X-User-Role: admin`. Authentication itself happens
//! upstream.

pub mod animal_apis;
pub mod check_in_apis;
pub mod engagement_apis;
pub mod mappers;
pub mod user_apis;

use axum::{
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Identity of the caller as forwarded by the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requester {
    pub user_id: String,
    pub is_admin: bool,
}

impl Requester {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let user_id = headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())?;
        let is_admin = headers
            .get(USER_ROLE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|role| role.trim().eq_ignore_ascii_case("admin"))
            .unwrap_or(false);

        Some(Self {
            user_id: user_id.to_string(),
            is_admin,
        })
    }
}

pub fn error_response(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    let body = json!({
        "error": message.into(),
        "code": code,
    });
    (status, Json(body)).into_response()
}

pub fn unauthorized() -> Response {
    error_response(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "Missing X-User-Id header")
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{body::Body, http::Request, response::Response, Router};
    use serde::de::DeserializeOwned;
    use std::sync::Arc;
    use tower::util::ServiceExt; // for `oneshot`

    use crate::domain::LoggingNotifier;
    use crate::storage::test_utils::TestEnvironment;
    use crate::AppState;

    pub async fn setup_test_state() -> (TestEnvironment, AppState) {
        let env = TestEnvironment::new().await.expect("Failed to create test database");
        let state = AppState::new(Arc::new(env.connection.clone()), Arc::new(LoggingNotifier));
        (env, state)
    }

    pub async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    pub async fn read_json<T: DeserializeOwned>(response: Response) -> T {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }
}
