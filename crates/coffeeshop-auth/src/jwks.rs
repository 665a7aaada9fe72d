//! Signing key set fetching and caching
//!
//! The identity provider publishes its public keys as a JSON Web Key Set at
//! `https://<domain>/.well-known/jwks.json`. [`JwksClient`] fetches that
//! document over HTTPS and keeps it for a bounded TTL. Any fetch failure
//! (unreachable host, timeout, non-2xx status, malformed JSON) becomes
//! [`AuthError::KeyFetch`] for the request that triggered it. The next
//! request tries again.
//!
//! [`KeySource`] is the seam the gate depends on. A [`KeySet`] is itself a
//! key source, which is how tests and offline deployments supply static keys.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::DecodingKey;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::config::{AuthConfig, ConfigError};
use crate::error::{AuthError, AuthResult};

/// One public signing key published by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    /// Key identifier matched against the token header's `kid`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,

    /// Key type (`RSA`)
    pub kty: String,

    /// Public key use (`sig`)
    #[serde(default, rename = "use", skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,

    /// Algorithm the key is intended for (`RS256`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,

    /// RSA modulus, base64url without padding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,

    /// RSA exponent, base64url without padding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

impl KeyRecord {
    /// Build an RSA signing key record
    pub fn rsa(kid: impl Into<String>, n: impl Into<String>, e: impl Into<String>) -> Self {
        Self {
            kid: Some(kid.into()),
            kty: "RSA".to_string(),
            key_use: Some("sig".to_string()),
            alg: Some("RS256".to_string()),
            n: Some(n.into()),
            e: Some(e.into()),
        }
    }

    /// Turn the RSA components into a verification key.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unexpected`] if the record is not an RSA key, a
    /// component is missing or a component is not valid base64url.
    pub fn decoding_key(&self) -> AuthResult<DecodingKey> {
        if self.kty != "RSA" {
            return Err(AuthError::Unexpected(format!(
                "unsupported key type {}",
                self.kty
            )));
        }
        let n = self
            .n
            .as_deref()
            .ok_or_else(|| AuthError::Unexpected("RSA key missing 'n' parameter".into()))?;
        let e = self
            .e
            .as_deref()
            .ok_or_else(|| AuthError::Unexpected("RSA key missing 'e' parameter".into()))?;

        for (name, value) in [("n", n), ("e", e)] {
            URL_SAFE_NO_PAD
                .decode(value)
                .map_err(|err| AuthError::Unexpected(format!("RSA '{name}' is not base64url: {err}")))?;
        }

        DecodingKey::from_rsa_components(n, e)
            .map_err(|err| AuthError::Unexpected(format!("Failed to create RSA key: {err}")))
    }
}

/// Key set as served by the provider's JWKS endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySet {
    /// Keys in the order the provider listed them
    pub keys: Vec<KeyRecord>,
}

impl KeySet {
    /// Create a key set from records
    pub fn new(keys: Vec<KeyRecord>) -> Self {
        Self { keys }
    }

    /// Find the key with a matching identifier. Records without a `kid`
    /// never match.
    pub fn find(&self, kid: &str) -> Option<&KeyRecord> {
        self.keys.iter().find(|key| key.kid.as_deref() == Some(kid))
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the set has no keys
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Anything that can supply the current signing keys
#[async_trait]
pub trait KeySource: Send + Sync + fmt::Debug {
    /// Return the current key set.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::KeyFetch`] when the keys cannot be obtained.
    async fn fetch_keys(&self) -> AuthResult<KeySet>;
}

#[async_trait]
impl KeySource for KeySet {
    async fn fetch_keys(&self) -> AuthResult<KeySet> {
        Ok(self.clone())
    }
}

#[async_trait]
impl<T: KeySource + ?Sized> KeySource for Arc<T> {
    async fn fetch_keys(&self) -> AuthResult<KeySet> {
        (**self).fetch_keys().await
    }
}

#[derive(Debug, Clone)]
struct CachedKeySet {
    keys: KeySet,
    fetched_at: Instant,
    ttl: Duration,
}

impl CachedKeySet {
    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < self.ttl
    }
}

/// HTTP client for the provider's JWKS endpoint with a TTL cache
///
/// # Example
///
/// ```rust,no_run
/// use coffeeshop_auth::{AuthConfig, JwksClient, KeySource};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let config = AuthConfig::new("dev-example.us.auth0.com", "coffee");
/// let client = JwksClient::from_config(&config)?;
///
/// let keys = client.fetch_keys().await?;
/// println!("provider publishes {} keys", keys.len());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct JwksClient {
    jwks_uri: String,
    http_client: reqwest::Client,
    cache: Arc<RwLock<Option<CachedKeySet>>>,
    cache_ttl: Duration,
}

impl fmt::Debug for JwksClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwksClient")
            .field("jwks_uri", &self.jwks_uri)
            .field("cache_ttl", &self.cache_ttl)
            .field("cache", &"<cached keys>")
            .finish()
    }
}

impl JwksClient {
    /// Create a client for the configured JWKS endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration does not validate or the
    /// HTTP client cannot be built.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let http_client = reqwest::Client::builder()
            .timeout(config.jwks_timeout)
            .build()?;

        Ok(Self {
            jwks_uri: config.jwks_uri.clone(),
            http_client,
            cache: Arc::new(RwLock::new(None)),
            cache_ttl: config.jwks_cache_ttl,
        })
    }

    /// The JWKS endpoint
    pub fn jwks_uri(&self) -> &str {
        &self.jwks_uri
    }

    /// Return cached keys if still fresh, otherwise fetch them.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::KeyFetch`] if the endpoint is unreachable, times
    /// out, answers with a non-success status or serves malformed JSON.
    pub async fn get_keys(&self) -> AuthResult<KeySet> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref()
                && cached.is_fresh()
            {
                debug!(jwks_uri = %self.jwks_uri, "Using cached key set");
                return Ok(cached.keys.clone());
            }
        }

        self.fetch_and_cache().await
    }

    /// Drop the cached key set so the next call fetches again
    pub async fn clear_cache(&self) {
        let mut cache = self.cache.write().await;
        *cache = None;
        debug!(jwks_uri = %self.jwks_uri, "Key set cache cleared");
    }

    async fn fetch_and_cache(&self) -> AuthResult<KeySet> {
        info!(jwks_uri = %self.jwks_uri, "Fetching key set");

        let response = self
            .http_client
            .get(&self.jwks_uri)
            .send()
            .await
            .map_err(|e| {
                error!(jwks_uri = %self.jwks_uri, error = %e, "Failed to fetch key set");
                AuthError::KeyFetch(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            error!(
                jwks_uri = %self.jwks_uri,
                status = %response.status(),
                "Key set endpoint returned error status"
            );
            return Err(AuthError::KeyFetch(format!(
                "endpoint returned status {}",
                response.status()
            )));
        }

        let keys: KeySet = response.json().await.map_err(|e| {
            error!(jwks_uri = %self.jwks_uri, error = %e, "Failed to parse key set JSON");
            AuthError::KeyFetch(format!("invalid key set format: {e}"))
        })?;

        info!(
            jwks_uri = %self.jwks_uri,
            key_count = keys.len(),
            "Fetched key set"
        );

        if !self.cache_ttl.is_zero() {
            let mut cache = self.cache.write().await;
            *cache = Some(CachedKeySet {
                keys: keys.clone(),
                fetched_at: Instant::now(),
                ttl: self.cache_ttl,
            });
        }

        Ok(keys)
    }
}

#[async_trait]
impl KeySource for JwksClient {
    async fn fetch_keys(&self) -> AuthResult<KeySet> {
        self.get_keys().await
    }
}
