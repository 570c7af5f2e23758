//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → request.rs (request ID, body buffering)
//!     → [routing resolves service → base address]
//!     → [forward engine calls the backend]
//!     → response.rs (errors → status + JSON)
//!     → Send to client
//! ```

pub mod landing;
pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeGatewayRequestId, X_REQUEST_ID};
pub use response::UnavailableBody;
pub use server::{AppState, HttpServer};
