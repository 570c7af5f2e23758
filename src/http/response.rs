//! Caller-facing error responses.
//!
//! # Responsibilities
//! - Map every gateway error to one status code and JSON body
//! - Give all transport failures the same 503 shape
//!
//! # Design Decisions
//! - Callers never see which transport cause occurred in the status; the
//!   cause is only in `detail`
//! - `tried_url` is the exact computed target URL, so clients can log or
//!   back off per backend

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

use crate::error::GatewayError;

/// Body of the 503 returned for every transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnavailableBody {
    pub error: String,
    pub detail: String,
    pub tried_url: String,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::UnknownService { .. } => StatusCode::NOT_FOUND,
            GatewayError::UnsupportedMethod(_) => StatusCode::METHOD_NOT_ALLOWED,
            GatewayError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::BodyRead(_) => StatusCode::BAD_REQUEST,
            GatewayError::Transport { .. } => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            GatewayError::UnknownService { .. } => {
                (status, Json(json!({ "error": "Service not found" }))).into_response()
            }
            GatewayError::UnsupportedMethod(_) => {
                (status, Json(json!({ "error": "Method not allowed" }))).into_response()
            }
            GatewayError::BodyTooLarge { .. } => {
                (status, Json(json!({ "error": "Request body too large" }))).into_response()
            }
            GatewayError::BodyRead(_) => {
                (status, Json(json!({ "error": "Failed to read request body" }))).into_response()
            }
            GatewayError::Transport { service, failure } => {
                let body = UnavailableBody {
                    error: format!("Service {service} unavailable"),
                    detail: failure.detail,
                    tried_url: failure.url,
                };
                (status, Json(body)).into_response()
            }
        }
    }
}

/// Plain 404 for paths outside every route.
pub fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}
