//! Key-set fetching and caching.
//!
//! The verifier depends on [`KeySetProvider`] rather than a concrete HTTP
//! client so tests can substitute a fixed key set. The production
//! implementation fetches the issuer's published JWKS document and caches
//! it with a TTL; a key-rotation miss triggers one forced refresh.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use parking_lot::RwLock;
use tracing::debug;

/// Maximum allowed key-set response size (1 MB).
const MAX_KEYSET_RESPONSE_SIZE: u64 = 1024 * 1024;

/// Error types for key-set operations.
#[derive(Debug, thiserror::Error)]
pub enum KeySetError {
    #[error("failed to fetch key set: {0}")]
    Fetch(String),

    #[error("failed to parse key set: {0}")]
    Parse(String),

    #[error("key set response too large: {0} bytes (max: {1})")]
    ResponseTooLarge(u64, u64),

    #[error("failed to create HTTP client: {0}")]
    HttpClient(String),
}

/// Source of the public key set used to verify bearer assertions.
#[async_trait]
pub trait KeySetProvider: Send + Sync {
    /// Return the current key set, served from cache when fresh.
    async fn key_set(&self) -> Result<JwkSet, KeySetError>;

    /// Bypass the cache and fetch a fresh key set (key rotation).
    async fn refresh(&self) -> Result<JwkSet, KeySetError>;
}

/// Cached key set with expiration tracking.
struct CachedKeySet {
    keys: JwkSet,
    fetched_at: Instant,
    ttl: Duration,
}

impl CachedKeySet {
    fn is_expired(&self) -> bool {
        self.fetched_at.elapsed() > self.ttl
    }
}

/// Key-set provider backed by the issuer's published certs endpoint.
pub struct RemoteKeySet {
    client: reqwest::Client,
    url: String,
    cache: RwLock<Option<CachedKeySet>>,
    ttl: Duration,
}

impl RemoteKeySet {
    /// Create a provider for a team domain's well-known certs endpoint.
    pub fn for_team_domain(
        team_domain: &str,
        ttl: Duration,
        fetch_timeout: Duration,
    ) -> Result<Self, KeySetError> {
        let url = format!("https://{}/cdn-cgi/access/certs", team_domain);
        Self::new(url, ttl, fetch_timeout)
    }

    /// Create a provider for an explicit key-set URL.
    pub fn new(
        url: impl Into<String>,
        ttl: Duration,
        fetch_timeout: Duration,
    ) -> Result<Self, KeySetError> {
        let client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| KeySetError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
            cache: RwLock::new(None),
            ttl,
        })
    }

    async fn fetch(&self) -> Result<JwkSet, KeySetError> {
        debug!(url = %self.url, "Fetching key set");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| KeySetError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(KeySetError::Fetch(format!("HTTP {}", response.status())));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > MAX_KEYSET_RESPONSE_SIZE {
                return Err(KeySetError::ResponseTooLarge(
                    content_length,
                    MAX_KEYSET_RESPONSE_SIZE,
                ));
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| KeySetError::Fetch(e.to_string()))?;

        if bytes.len() as u64 > MAX_KEYSET_RESPONSE_SIZE {
            return Err(KeySetError::ResponseTooLarge(
                bytes.len() as u64,
                MAX_KEYSET_RESPONSE_SIZE,
            ));
        }

        let keys: JwkSet =
            serde_json::from_slice(&bytes).map_err(|e| KeySetError::Parse(e.to_string()))?;

        debug!(key_count = keys.keys.len(), "Fetched key set");
        Ok(keys)
    }

    fn store(&self, keys: &JwkSet) {
        let mut cache = self.cache.write();
        *cache = Some(CachedKeySet {
            keys: keys.clone(),
            fetched_at: Instant::now(),
            ttl: self.ttl,
        });
    }
}

#[async_trait]
impl KeySetProvider for RemoteKeySet {
    async fn key_set(&self) -> Result<JwkSet, KeySetError> {
        {
            let cache = self.cache.read();
            if let Some(cached) = cache.as_ref() {
                if !cached.is_expired() {
                    return Ok(cached.keys.clone());
                }
            }
        }

        let keys = self.fetch().await?;
        self.store(&keys);
        Ok(keys)
    }

    async fn refresh(&self) -> Result<JwkSet, KeySetError> {
        let keys = self.fetch().await?;
        self.store(&keys);
        Ok(keys)
    }
}

/// Fixed in-memory key set, for tests and offline verification setups.
pub struct StaticKeySet {
    keys: JwkSet,
}

impl StaticKeySet {
    pub fn new(keys: JwkSet) -> Self {
        Self { keys }
    }
}

#[async_trait]
impl KeySetProvider for StaticKeySet {
    async fn key_set(&self) -> Result<JwkSet, KeySetError> {
        Ok(self.keys.clone())
    }

    async fn refresh(&self) -> Result<JwkSet, KeySetError> {
        Ok(self.keys.clone())
    }
}
