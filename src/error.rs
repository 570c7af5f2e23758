//! Request-level errors.

use axum::http::Method;
use thiserror::Error;

use crate::forward::TransportFailure;

/// Everything that stops a request short of a relayed backend response.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Service name absent from the registry. No backend was contacted.
    #[error("service `{name}` is not registered")]
    UnknownService { name: String },

    /// Method outside GET/POST/PUT/DELETE. Rejected before routing.
    #[error("method {0} is not forwarded")]
    UnsupportedMethod(Method),

    #[error("request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    /// The outbound call failed. Never retried.
    #[error("service `{service}` unavailable")]
    Transport {
        service: String,
        #[source]
        failure: TransportFailure,
    },
}
