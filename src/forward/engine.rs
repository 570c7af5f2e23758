//! Outbound request execution.
//!
//! # Responsibilities
//! - Rebuild the caller's request against the backend target URL
//! - Bound the whole exchange with the upstream timeout
//! - Buffer the backend response and clean it for relay
//!
//! # Design Decisions
//! - One attempt per request; retries belong to the caller
//! - Bodies are opaque bytes in both directions
//! - Outbound requests are HTTP/1.1 regardless of the inbound version

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use http_body_util::BodyExt;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::forward::failure::{FailureKind, TransportFailure};
use crate::forward::headers::HeaderFilter;
use crate::forward::target::{target_url, with_query};

/// Request as received by the gateway, ready to be forwarded.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    pub headers: HeaderMap,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
    pub body: Bytes,
}

impl ProxyRequest {
    pub fn new(method: Method, headers: HeaderMap, query: Option<String>, body: Bytes) -> Self {
        Self {
            method,
            headers,
            query,
            body,
        }
    }
}

/// Buffered backend response.
#[derive(Debug, Clone)]
pub struct ProxyResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl IntoResponse for ProxyResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

/// Forwards requests to backends. Cheap to clone; clones share the client.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
    request_headers: Arc<HeaderFilter>,
    response_headers: Arc<HeaderFilter>,
}

impl Forwarder {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            timeout,
            request_headers: Arc::new(HeaderFilter::outbound_request()),
            response_headers: Arc::new(HeaderFilter::relayed_response()),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Forward `request` to `base_address[/sub_path]`.
    ///
    /// Exactly one outbound call is made (none if the target is not a valid
    /// URI). The backend's status and headers come back verbatim except for
    /// `Content-Length`.
    pub async fn forward(
        &self,
        base_address: &str,
        sub_path: &str,
        request: ProxyRequest,
    ) -> Result<ProxyResponse, TransportFailure> {
        let url = target_url(base_address, sub_path);
        let uri: Uri = with_query(&url, request.query.as_deref())
            .parse()
            .map_err(|e: axum::http::uri::InvalidUri| {
                TransportFailure::new(FailureKind::InvalidTarget, e.to_string(), url.as_str())
            })?;

        let mut outbound = Request::builder()
            .method(request.method)
            .uri(uri)
            .body(Body::from(request.body))
            .map_err(|e| {
                TransportFailure::new(FailureKind::InvalidTarget, e.to_string(), url.as_str())
            })?;
        *outbound.headers_mut() = self.request_headers.filter(&request.headers);

        tracing::debug!(target_url = %url, method = %outbound.method(), "Forwarding request");

        let outcome = tokio::time::timeout(self.timeout, self.exchange(outbound, &url)).await;
        outcome.unwrap_or_else(|_| Err(TransportFailure::timeout(self.timeout, url)))
    }

    async fn exchange(
        &self,
        request: Request<Body>,
        url: &str,
    ) -> Result<ProxyResponse, TransportFailure> {
        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| TransportFailure::from_client(&e, url))?;

        let (parts, body) = response.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|e| TransportFailure::from_body(&e, url))?
            .to_bytes();

        let mut headers = parts.headers;
        self.response_headers.strip(&mut headers);

        Ok(ProxyResponse {
            status: parts.status,
            headers,
            body,
        })
    }
}

impl std::fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forwarder")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Methods the gateway forwards. Anything else is rejected before routing.
pub fn is_forwarded_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::POST | Method::PUT | Method::DELETE
    )
}
