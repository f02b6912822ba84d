//! Request ID middleware.
//!
//! Every request runs inside a tracing span carrying its request ID, which
//! is echoed back in the `X-Request-ID` response header.

use axum::{
    body::Body,
    http::{header::HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header name for request ID.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

const MAX_REQUEST_ID_LEN: usize = 128;

/// Request ID stored in request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Uses a well-formed incoming `X-Request-ID` or generates a UUID v4.
fn resolve_request_id(incoming: Option<&HeaderValue>) -> String {
    incoming
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

pub async fn trace_id(mut req: Request<Body>, next: Next) -> Response {
    let request_id = resolve_request_id(req.headers().get(REQUEST_ID_HEADER));

    req.extensions_mut().insert(RequestId(request_id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let start = std::time::Instant::now();
        let mut response = next.run(req).await;

        tracing::info!(
            status = response.status().as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );

        if let Ok(header_value) = HeaderValue::from_str(&request_id) {
            response
                .headers_mut()
                .insert(HeaderName::from_static("x-request-id"), header_value);
        }

        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incoming_request_id_is_kept() {
        let value = HeaderValue::from_static("req-123_abc.xyz");
        assert_eq!(resolve_request_id(Some(&value)), "req-123_abc.xyz");
    }

    #[test]
    fn test_missing_request_id_is_generated() {
        let generated = resolve_request_id(None);
        assert!(Uuid::parse_str(&generated).is_ok());
    }

    #[test]
    fn test_blank_or_oversized_request_id_is_replaced() {
        let blank = HeaderValue::from_static("   ");
        assert!(Uuid::parse_str(&resolve_request_id(Some(&blank))).is_ok());

        let long = "x".repeat(MAX_REQUEST_ID_LEN + 1);
        let oversized = HeaderValue::from_str(&long).unwrap();
        assert_ne!(resolve_request_id(Some(&oversized)), long);
    }
}
