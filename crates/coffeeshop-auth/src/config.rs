//! Authorization configuration
//!
//! [`AuthConfig`] is built once at process start and shared read-only by the
//! verifier and the key fetcher. The issuer and JWKS URI are derived from the
//! identity provider domain unless explicitly overridden.

use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;

/// Default lifetime of a cached key set
pub const DEFAULT_JWKS_CACHE_TTL: Duration = Duration::from_secs(600);

/// Default request timeout for key set fetches
pub const DEFAULT_JWKS_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Identity provider domain is empty
    #[error("Identity provider domain must not be empty")]
    EmptyDomain,

    /// API audience is empty
    #[error("API audience must not be empty")]
    EmptyAudience,

    /// No accepted signing algorithm
    #[error("At least one signing algorithm must be accepted")]
    NoAlgorithms,

    /// Algorithm name could not be parsed
    #[error("Unknown signing algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Algorithm is parseable but cannot be verified with an RSA key record
    #[error("Algorithm {0:?} is not allowed, only RSA algorithms (RS*, PS*) are accepted")]
    DisallowedAlgorithm(Algorithm),

    /// JWKS URI is plain HTTP on a non-local host
    #[error("JWKS endpoint must use HTTPS (HTTP only allowed for localhost): {0}")]
    InsecureJwksUri(String),

    /// HTTP client for the key fetcher could not be built
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Token verification settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// Identity provider domain (e.g. `dev-example.us.auth0.com`)
    pub domain: String,
    /// Expected `aud` claim
    pub audience: String,
    /// Expected `iss` claim
    pub issuer: String,
    /// Where the provider publishes its signing keys
    pub jwks_uri: String,
    /// Accepted signing algorithms
    pub algorithms: Vec<Algorithm>,
    /// Clock skew tolerated when checking `exp`
    pub leeway: Duration,
    /// How long a fetched key set is reused (zero disables caching)
    pub jwks_cache_ttl: Duration,
    /// Request timeout for key set fetches
    pub jwks_timeout: Duration,
}

impl AuthConfig {
    /// Create a configuration for a provider domain and API audience
    ///
    /// # Example
    ///
    /// ```rust
    /// use coffeeshop_auth::AuthConfig;
    ///
    /// let config = AuthConfig::new("dev-example.us.auth0.com", "coffee");
    /// assert_eq!(config.issuer, "https://dev-example.us.auth0.com/");
    /// assert_eq!(
    ///     config.jwks_uri,
    ///     "https://dev-example.us.auth0.com/.well-known/jwks.json"
    /// );
    /// ```
    pub fn new(domain: impl Into<String>, audience: impl Into<String>) -> Self {
        let domain = normalize_domain(&domain.into());
        Self {
            issuer: format!("https://{domain}/"),
            jwks_uri: format!("https://{domain}/.well-known/jwks.json"),
            domain,
            audience: audience.into(),
            algorithms: vec![Algorithm::RS256],
            leeway: Duration::ZERO,
            jwks_cache_ttl: DEFAULT_JWKS_CACHE_TTL,
            jwks_timeout: DEFAULT_JWKS_TIMEOUT,
        }
    }

    /// Override the expected issuer
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    /// Override the JWKS endpoint
    pub fn with_jwks_uri(mut self, jwks_uri: impl Into<String>) -> Self {
        self.jwks_uri = jwks_uri.into();
        self
    }

    /// Set accepted signing algorithms
    pub fn with_algorithms(mut self, algorithms: Vec<Algorithm>) -> Self {
        self.algorithms = algorithms;
        self
    }

    /// Set clock skew leeway
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway;
        self
    }

    /// Set key set cache TTL
    pub fn with_jwks_cache_ttl(mut self, ttl: Duration) -> Self {
        self.jwks_cache_ttl = ttl;
        self
    }

    /// Set key set fetch timeout
    pub fn with_jwks_timeout(mut self, timeout: Duration) -> Self {
        self.jwks_timeout = timeout;
        self
    }

    /// Check the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the domain or audience is empty, no
    /// algorithm is accepted, a non-RSA algorithm is accepted, or the JWKS
    /// URI is plain HTTP on a non-local host.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.domain.is_empty() {
            return Err(ConfigError::EmptyDomain);
        }
        if self.audience.trim().is_empty() {
            return Err(ConfigError::EmptyAudience);
        }
        if self.algorithms.is_empty() {
            return Err(ConfigError::NoAlgorithms);
        }
        if let Some(alg) = self.algorithms.iter().find(|alg| !is_rsa_algorithm(**alg)) {
            return Err(ConfigError::DisallowedAlgorithm(*alg));
        }
        if !is_secure_jwks_uri(&self.jwks_uri) {
            return Err(ConfigError::InsecureJwksUri(self.jwks_uri.clone()));
        }
        Ok(())
    }
}

/// Parse a comma-separated algorithm list such as `"RS256, PS256"`.
///
/// # Errors
///
/// Returns [`ConfigError::UnknownAlgorithm`] for a name `jsonwebtoken` does
/// not recognise.
pub fn parse_algorithms(list: &str) -> Result<Vec<Algorithm>, ConfigError> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            Algorithm::from_str(name).map_err(|_| ConfigError::UnknownAlgorithm(name.to_string()))
        })
        .collect()
}

fn normalize_domain(domain: &str) -> String {
    let domain = domain.trim();
    let domain = domain.strip_prefix("https://").unwrap_or(domain);
    domain.trim_end_matches('/').to_string()
}

fn is_rsa_algorithm(alg: Algorithm) -> bool {
    matches!(
        alg,
        Algorithm::RS256
            | Algorithm::RS384
            | Algorithm::RS512
            | Algorithm::PS256
            | Algorithm::PS384
            | Algorithm::PS512
    )
}

fn is_secure_jwks_uri(uri: &str) -> bool {
    if uri.starts_with("https://") {
        return true;
    }
    let Some(rest) = uri.strip_prefix("http://") else {
        return false;
    };
    let authority = rest.split('/').next().unwrap_or_default();
    let host = authority.split(':').next().unwrap_or_default();
    matches!(host, "localhost" | "127.0.0.1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_issuer_and_jwks_uri() {
        let config = AuthConfig::new("coffee.eu.auth0.com", "coffee");
        assert_eq!(config.issuer, "https://coffee.eu.auth0.com/");
        assert_eq!(
            config.jwks_uri,
            "https://coffee.eu.auth0.com/.well-known/jwks.json"
        );
        assert_eq!(config.algorithms, vec![Algorithm::RS256]);
        assert_eq!(config.leeway, Duration::ZERO);
        assert_eq!(config.jwks_cache_ttl, DEFAULT_JWKS_CACHE_TTL);
    }

    #[test]
    fn test_domain_given_as_url() {
        let config = AuthConfig::new("https://coffee.eu.auth0.com/", "coffee");
        assert_eq!(config.domain, "coffee.eu.auth0.com");
        assert_eq!(config.issuer, "https://coffee.eu.auth0.com/");
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(AuthConfig::new("coffee.eu.auth0.com", "coffee").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        assert!(matches!(
            AuthConfig::new("", "coffee").validate(),
            Err(ConfigError::EmptyDomain)
        ));
        assert!(matches!(
            AuthConfig::new("coffee.eu.auth0.com", " ").validate(),
            Err(ConfigError::EmptyAudience)
        ));
        assert!(matches!(
            AuthConfig::new("coffee.eu.auth0.com", "coffee")
                .with_algorithms(vec![])
                .validate(),
            Err(ConfigError::NoAlgorithms)
        ));
    }

    #[test]
    fn test_validate_rejects_symmetric_algorithms() {
        let config = AuthConfig::new("coffee.eu.auth0.com", "coffee")
            .with_algorithms(vec![Algorithm::RS256, Algorithm::HS256]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DisallowedAlgorithm(Algorithm::HS256))
        ));
    }

    #[test]
    fn test_validate_jwks_uri_scheme() {
        let base = AuthConfig::new("coffee.eu.auth0.com", "coffee");
        assert!(
            base.clone()
                .with_jwks_uri("http://127.0.0.1:8080/jwks")
                .validate()
                .is_ok()
        );
        assert!(
            base.clone()
                .with_jwks_uri("http://localhost/jwks")
                .validate()
                .is_ok()
        );
        assert!(matches!(
            base.clone()
                .with_jwks_uri("http://localhost.attacker.net/jwks")
                .validate(),
            Err(ConfigError::InsecureJwksUri(_))
        ));
        assert!(matches!(
            base.with_jwks_uri("http://coffee.eu.auth0.com/jwks").validate(),
            Err(ConfigError::InsecureJwksUri(_))
        ));
    }

    #[test]
    fn test_parse_algorithms() {
        assert_eq!(
            parse_algorithms("RS256, PS256").unwrap(),
            vec![Algorithm::RS256, Algorithm::PS256]
        );
        assert_eq!(parse_algorithms("RS256,").unwrap(), vec![Algorithm::RS256]);
        assert!(matches!(
            parse_algorithms("RS257"),
            Err(ConfigError::UnknownAlgorithm(name)) if name == "RS257"
        ));
    }
}
