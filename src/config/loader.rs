//! Configuration loading from disk and environment.
//!
//! Secrets (service-token pair, upstream bearer token) are expected from the
//! environment; the optional TOML file carries non-secret operational
//! settings. Environment values are read exactly once, at startup, and win
//! over file values.

use std::env;
use std::fs;
use std::path::Path;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {0:?}")]
    Validation(Vec<ValidationError>),
}

/// Load configuration: optional TOML file, then environment overrides,
/// then semantic validation.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Apply environment overrides onto a parsed config.
///
/// Read once per process lifetime; the resulting config is immutable for
/// the life of every request.
fn apply_env_overrides(config: &mut GatewayConfig) {
    if let Some(v) = non_empty_env("ACCESS_TEAM_DOMAIN") {
        config.trust.team_domain = Some(v);
    }
    if let Some(v) = non_empty_env("ACCESS_AUD") {
        config.trust.audience = Some(v);
    }
    if let Some(v) = non_empty_env("ACCESS_CLIENT_ID") {
        config.trust.service_client_id = Some(v);
    }
    if let Some(v) = non_empty_env("ACCESS_CLIENT_SECRET") {
        config.trust.service_client_secret = Some(v);
    }
    if let Some(v) = non_empty_env("UPSTREAM_BEARER_TOKEN") {
        config.upstream.bearer_token = Some(v);
    }
    if let Some(v) = non_empty_env("UPSTREAM_ORIGIN") {
        config.upstream.origin = v;
    }
    if let Some(v) = non_empty_env("GATEWAY_BIND") {
        config.listener.bind_address = v;
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.is_empty())
}
