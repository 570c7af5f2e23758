//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate a unique request ID (UUID v4) when the caller sent none
//! - Enforce the body size limit while buffering
//! - Turn an inbound axum request into a [`ProxyRequest`]
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing; it is an ordinary
//!   header, so backends receive it too
//! - Bodies are buffered whole; the forwarder never streams

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::error::GatewayError;
use crate::forward::ProxyRequest;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates `x-request-id` values.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeGatewayRequestId;

impl MakeRequestId for MakeGatewayRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let value = HeaderValue::from_str(&Uuid::new_v4().to_string()).ok()?;
        Some(RequestId::new(value))
    }
}

/// Request ID of `request`, or `"unknown"` if none was assigned.
pub fn request_id<B>(request: &Request<B>) -> String {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Buffer the body (at most `limit` bytes) and package the request for
/// forwarding.
pub async fn into_proxy_request(
    request: Request<Body>,
    limit: usize,
) -> Result<ProxyRequest, GatewayError> {
    let (parts, body) = request.into_parts();

    let body = Limited::new(body, limit)
        .collect()
        .await
        .map_err(|e| {
            if e.is::<LengthLimitError>() {
                GatewayError::BodyTooLarge { limit }
            } else {
                GatewayError::BodyRead(e.to_string())
            }
        })?
        .to_bytes();

    Ok(ProxyRequest::new(
        parts.method,
        parts.headers,
        parts.uri.query().map(str::to_owned),
        body,
    ))
}
