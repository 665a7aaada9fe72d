//! Command line and environment configuration

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Args, Parser};
use coffeeshop_auth::{AuthConfig, ConfigError, parse_algorithms};

use crate::observability::LogFormat;

/// Coffee shop drinks API
#[derive(Debug, Clone, Parser)]
#[command(
    name = "coffeeshop-server",
    version,
    about = "Drinks REST API guarded by identity provider bearer tokens"
)]
pub struct ServerArgs {
    /// Address to listen on
    #[arg(long, env = "COFFEESHOP_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    #[command(flatten)]
    pub auth: AuthArgs,

    /// Log filter directive (RUST_LOG takes precedence)
    #[arg(long, env = "COFFEESHOP_LOG")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, env = "COFFEESHOP_LOG_FORMAT", value_enum, default_value = "pretty")]
    pub log_format: LogFormat,

    /// Insert the sample drink at startup
    #[arg(long, env = "COFFEESHOP_SEED")]
    pub seed: bool,
}

/// Token verification settings
#[derive(Debug, Clone, Args)]
pub struct AuthArgs {
    /// Identity provider domain, e.g. dev-example.us.auth0.com
    #[arg(long = "auth0-domain", env = "AUTH0_DOMAIN")]
    pub domain: String,

    /// Expected token audience
    #[arg(long = "api-audience", env = "API_AUDIENCE")]
    pub audience: String,

    /// Accepted signing algorithms, comma separated
    #[arg(long, env = "AUTH_ALGORITHMS", default_value = "RS256")]
    pub algorithms: String,

    /// Expected issuer (defaults to https://<domain>/)
    #[arg(long, env = "AUTH_ISSUER")]
    pub issuer: Option<String>,

    /// JWKS endpoint (defaults to https://<domain>/.well-known/jwks.json)
    #[arg(long, env = "AUTH_JWKS_URI")]
    pub jwks_uri: Option<String>,

    /// Clock skew tolerated on expiry, in seconds
    #[arg(long, env = "AUTH_LEEWAY_SECS", default_value_t = 0)]
    pub leeway_secs: u64,

    /// How long fetched keys are reused, in seconds (0 disables caching)
    #[arg(long, env = "AUTH_JWKS_CACHE_TTL_SECS", default_value_t = 600)]
    pub jwks_cache_ttl_secs: u64,

    /// Key fetch timeout, in seconds
    #[arg(long, env = "AUTH_JWKS_TIMEOUT_SECS", default_value_t = 10)]
    pub jwks_timeout_secs: u64,
}

impl AuthArgs {
    /// Build and validate the verification configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for an unknown algorithm name or a
    /// configuration that does not validate.
    pub fn to_config(&self) -> Result<AuthConfig, ConfigError> {
        let mut config = AuthConfig::new(&self.domain, &self.audience)
            .with_algorithms(parse_algorithms(&self.algorithms)?)
            .with_leeway(Duration::from_secs(self.leeway_secs))
            .with_jwks_cache_ttl(Duration::from_secs(self.jwks_cache_ttl_secs))
            .with_jwks_timeout(Duration::from_secs(self.jwks_timeout_secs));

        if let Some(issuer) = &self.issuer {
            config = config.with_issuer(issuer);
        }
        if let Some(jwks_uri) = &self.jwks_uri {
            config = config.with_jwks_uri(jwks_uri);
        }

        config.validate()?;
        Ok(config)
    }
}
