//! Service gateway library.
//!
//! Relays `/<prefix>/<service>/<sub_path>` requests to the backend registered
//! for `<service>` and translates backend unavailability into a uniform 503.

pub mod config;
pub mod error;
pub mod forward;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use forward::{Forwarder, ProxyRequest, ProxyResponse, TransportFailure};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::ServiceRegistry;
