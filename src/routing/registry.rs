//! Service registry.
//!
//! # Responsibilities
//! - Map logical service names to backend base addresses
//! - Answer lookups with the address or an explicit unknown-service error
//!
//! # Design Decisions
//! - Built once from validated config, immutable afterwards (shared via Arc)
//! - Case-sensitive exact match on the name
//! - Ordered map so listings (landing page, startup log) are deterministic

use std::collections::BTreeMap;

use crate::config::GatewayConfig;
use crate::error::GatewayError;

#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: BTreeMap<String, String>,
}

impl ServiceRegistry {
    pub fn new<I, K, V>(services: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            services: services
                .into_iter()
                .map(|(name, address)| (name.into(), address.into()))
                .collect(),
        }
    }

    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(config.services.clone())
    }

    /// Look up the base address of `name`.
    ///
    /// An absent name is permanent for the lifetime of the process and is
    /// reported as [`GatewayError::UnknownService`].
    pub fn resolve(&self, name: &str) -> Result<&str, GatewayError> {
        self.services
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| GatewayError::UnknownService {
                name: name.to_string(),
            })
    }

    /// The registry's own copy of `name`, if registered.
    pub fn registered_name(&self, name: &str) -> Option<&str> {
        self.services
            .get_key_value(name)
            .map(|(name, _)| name.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.services
            .iter()
            .map(|(name, address)| (name.as_str(), address.as_str()))
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
