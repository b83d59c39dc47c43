//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the edge gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Perimeter trust configuration (identity provider + service tokens).
    pub trust: TrustConfig,

    /// Fixed upstream backend target.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Trust configuration for the credential verifier.
///
/// Team domain and audience must both be present for the bearer-assertion
/// path to be attempted; their absence is a configuration fault (500), not
/// an authentication failure. A missing service-token pair merely disables
/// that credential path.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TrustConfig {
    /// Identity provider team domain (e.g., "example.cloudflareaccess.com").
    pub team_domain: Option<String>,

    /// Expected audience tag of inbound bearer assertions.
    pub audience: Option<String>,

    /// Configured service-token client id.
    pub service_client_id: Option<String>,

    /// Configured service-token client secret.
    pub service_client_secret: Option<String>,
}

impl TrustConfig {
    /// True when both halves of the service-token pair are configured.
    pub fn has_service_token(&self) -> bool {
        self.service_client_id.is_some() && self.service_client_secret.is_some()
    }
}

/// Fixed upstream backend target.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Backend origin (e.g., "http://127.0.0.1:8787").
    pub origin: String,

    /// Bearer token injected on the chat completions route.
    /// Unset means that route fails with a configuration error.
    pub bearer_token: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            origin: "http://127.0.0.1:8787".to_string(),
            bearer_token: None,
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    /// Websocket bridge sessions are exempt once upgraded.
    pub request_secs: u64,

    /// Network timeout for a single key-set fetch in seconds.
    pub key_fetch_secs: u64,

    /// Key-set cache TTL in seconds.
    pub key_cache_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            key_fetch_secs: 10,
            key_cache_secs: 3600,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
