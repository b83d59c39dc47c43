//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the upstream origin parses as an http/https URL
//! - Check the bind addresses parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Missing trust configuration is a warning, never an error: the
//!   verifier turns it into a per-request configuration fault (500)

use std::net::SocketAddr;

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic validation failure.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("invalid upstream origin '{origin}': {reason}")]
    UpstreamOrigin { origin: String, reason: String },
}

/// Validate a parsed configuration. Pure function, runs once at startup.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    match Url::parse(&config.upstream.origin) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::UpstreamOrigin {
            origin: config.upstream.origin.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::UpstreamOrigin {
            origin: config.upstream.origin.clone(),
            reason: e.to_string(),
        }),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn rejects_bad_bind_address() {
        let mut config = GatewayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::BindAddress(_)));
    }

    #[test]
    fn rejects_non_http_origin() {
        let mut config = GatewayConfig::default();
        config.upstream.origin = "ftp://backend".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::UpstreamOrigin { .. }));
    }

    #[test]
    fn missing_trust_config_is_not_an_error() {
        let config = GatewayConfig::default();
        assert!(config.trust.team_domain.is_none());
        assert!(validate_config(&config).is_ok());
    }
}
