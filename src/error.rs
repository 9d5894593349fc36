//! Error-to-HTTP response conversion.
//!
//! Wraps [`unfurl_core::Error`] in a local type implementing `IntoResponse`,
//! mapping `http_status()` onto the response and shaping a JSON error body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Wrapper so we can implement `IntoResponse` for an external type.
pub struct AppError {
    inner: unfurl_core::Error,
}

impl AppError {
    pub fn new(inner: unfurl_core::Error) -> Self {
        Self { inner }
    }
}

impl From<unfurl_core::Error> for AppError {
    fn from(e: unfurl_core::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                "Server error in API handler"
            );
        }

        let body = json!({
            "error": self.inner.to_string(),
            "code": self.inner.code(),
        });

        let mut response = (status, axum::Json(body)).into_response();

        if let unfurl_core::Error::RateLimited { retry_in } = self.inner {
            if let Ok(value) = retry_in.to_string().parse() {
                response.headers_mut().insert("Retry-After", value);
            }
        }

        response
    }
}
