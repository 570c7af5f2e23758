//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Every service resolves to an absolute `http://` base address
//! - Validate value ranges (timeouts > 0, limits > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),

    #[error("routing.prefix `{0}` must be a single non-empty path segment")]
    InvalidPrefix(String),

    #[error("no services configured")]
    NoServices,

    #[error("service name `{0}` must be a single non-empty path segment")]
    InvalidServiceName(String),

    #[error("service `{name}` has invalid address `{address}`: {reason}")]
    InvalidServiceAddress {
        name: String,
        address: String,
        reason: String,
    },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if !is_segment(&config.routing.prefix) {
        errors.push(ValidationError::InvalidPrefix(config.routing.prefix.clone()));
    }

    if config.services.is_empty() {
        errors.push(ValidationError::NoServices);
    }

    for (name, address) in &config.services {
        if !is_segment(name) {
            errors.push(ValidationError::InvalidServiceName(name.clone()));
        }
        if let Err(reason) = check_base_address(address) {
            errors.push(ValidationError::InvalidServiceAddress {
                name: name.clone(),
                address: address.clone(),
                reason,
            });
        }
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError::Zero("upstream.timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }
    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::Zero("limits.max_body_size"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_segment(value: &str) -> bool {
    !value.is_empty() && !value.contains('/')
}

fn check_base_address(address: &str) -> Result<(), String> {
    let url = Url::parse(address).map_err(|e| e.to_string())?;
    if url.scheme() != "http" {
        return Err(format!("unsupported scheme `{}`", url.scheme()));
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err("query and fragment are not allowed".to_string());
    }
    Ok(())
}
