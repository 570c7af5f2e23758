//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → matcher.rs (strip prefix, split service / sub-path)
//!     → registry.rs (service name → base address)
//!     → Return: base address + sub-path, or UnknownService
//!
//! Registry construction (at startup):
//!     GatewayConfig.services
//!     → ServiceRegistry (frozen, shared via Arc)
//! ```
//!
//! # Design Decisions
//! - Registry built at startup, immutable at runtime
//! - Deterministic: same path always resolves to the same target
//! - Unknown services never touch the network

pub mod matcher;
pub mod registry;

pub use matcher::{match_route, RouteMatch};
pub use registry::ServiceRegistry;
