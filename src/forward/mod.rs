//! Forwarding engine.
//!
//! # Data Flow
//! ```text
//! (base address, sub-path, ProxyRequest)
//!     → target.rs (target URL + raw query)
//!     → headers.rs (drop Host)
//!     → engine.rs (single call, bounded by the upstream timeout)
//!     → headers.rs (drop Content-Length)
//!     → ProxyResponse | failure.rs TransportFailure
//! ```

pub mod engine;
pub mod failure;
pub mod headers;
pub mod target;

pub use engine::{is_forwarded_method, Forwarder, ProxyRequest, ProxyResponse};
pub use failure::{FailureKind, TransportFailure};
pub use headers::HeaderFilter;
pub use target::target_url;
