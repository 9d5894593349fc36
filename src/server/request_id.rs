//! Request identifiers on tracing spans.
//!
//! Every request runs inside a span tagged with a request ID (the client's
//! `x-request-id` if it sent one, otherwise a fresh UUID), the method, and
//! the path. Handler logs inherit these fields, so a slow or failed
//! resolution can be tied back to the request that triggered it. The ID is
//! echoed on the response.

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

/// Header name used for the request identifier.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Run the handler inside an identified span and echo the ID back.
pub async fn request_id_middleware(request: Request<Body>, next: Next) -> Response {
    let id = incoming_id(request.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!(
        "request",
        request_id = %id,
        method = %request.method(),
        path = %request.uri().path(),
    );
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(X_REQUEST_ID.clone(), value);
    }

    response
}

fn incoming_id(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(&X_REQUEST_ID)?.to_str().ok()?;
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
