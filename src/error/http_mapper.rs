//! HTTP response mapping.
//!
//! Maps authorization failures to HTTP responses at the middleware boundary.
//! The body is JSON so clients can tell a denial apart from handler output.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::UnauthorizedError;

/// Resolve the status carried by a failure, falling back to 403 when the
/// stored code is not a valid HTTP status.
pub fn status_of(error: &UnauthorizedError) -> StatusCode {
    StatusCode::from_u16(error.status).unwrap_or(StatusCode::FORBIDDEN)
}

impl IntoResponse for UnauthorizedError {
    fn into_response(self) -> Response {
        let status = status_of(&self);
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
