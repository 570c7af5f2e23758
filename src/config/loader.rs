//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Suffix of environment variables that override a service address,
/// e.g. `AUTH_SERVICE_URL=http://auth:5001` re-points service `auth`.
/// Only services already present in the config are affected.
pub const SERVICE_URL_SUFFIX: &str = "_SERVICE_URL";

/// Environment variable overriding `listener.bind_address`.
pub const BIND_ADDRESS_VAR: &str = "GATEWAY_BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from an optional TOML file, apply environment
/// overrides from the process environment, then validate.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    load_config_with_env(path, std::env::vars())
}

/// Same as [`load_config`] with an explicit set of environment variables.
pub fn load_config_with_env<I>(path: Option<&Path>, vars: I) -> Result<GatewayConfig, ConfigError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut config = match path {
        Some(path) => parse_config(&fs::read_to_string(path)?)?,
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, vars);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML document without validating it.
pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Apply `<NAME>_SERVICE_URL` and `GATEWAY_BIND_ADDRESS` overrides.
///
/// A `<NAME>_SERVICE_URL` whose name is not a configured service is ignored:
/// the environment re-points services, it never adds them.
pub fn apply_env_overrides<I>(config: &mut GatewayConfig, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        if key == BIND_ADDRESS_VAR {
            config.listener.bind_address = value;
        } else if let Some(name) = key.strip_suffix(SERVICE_URL_SUFFIX) {
            if name.is_empty() {
                continue;
            }
            let name = name.to_lowercase();
            match config.services.get_mut(&name) {
                Some(address) => {
                    tracing::debug!(service = %name, address = %value, "Service address from environment");
                    *address = value;
                }
                None => {
                    tracing::debug!(variable = %key, "Ignoring address for unconfigured service");
                }
            }
        }
    }
}
