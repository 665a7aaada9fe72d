//! Authorization gate
//!
//! [`AuthGate::authorize`] is the single entry point protected operations
//! call before doing anything else. It runs extraction, key lookup,
//! verification and the permission check in sequence and stops at the first
//! failure. A payload is only returned when every step passed.
//!
//! ```text
//! Start -> HeaderExtracted -> KeyMatched -> SignatureValid -> ClaimsValid -> PermissionGranted
//!   \            \                \               \               \
//!    +------------+----------------+---------------+---------------+--> failed(code)
//! ```

use std::fmt;
use std::sync::Arc;

use http::HeaderMap;
use tracing::{debug, error, warn};

use crate::claims::DecodedPayload;
use crate::config::{AuthConfig, ConfigError};
use crate::error::{AuthError, AuthFailure};
use crate::extract::extract_bearer_token;
use crate::jwks::{JwksClient, KeySource};
use crate::permissions::check_permission;
use crate::verifier::TokenVerifier;

/// Progress of one verification attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthStage {
    /// Nothing checked yet
    Start,
    /// Bearer token read from the `Authorization` header
    HeaderExtracted,
    /// Signing key found for the token's `kid`
    KeyMatched,
    /// Signature verified
    SignatureValid,
    /// Expiry, audience and issuer accepted
    ClaimsValid,
    /// Required permission present (terminal success)
    PermissionGranted,
}

impl fmt::Display for AuthStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::HeaderExtracted => "header_extracted",
            Self::KeyMatched => "key_matched",
            Self::SignatureValid => "signature_valid",
            Self::ClaimsValid => "claims_valid",
            Self::PermissionGranted => "permission_granted",
        };
        f.write_str(name)
    }
}

/// Composes token extraction, verification and the permission check
#[derive(Debug, Clone)]
pub struct AuthGate {
    verifier: TokenVerifier,
    keys: Arc<dyn KeySource>,
}

impl AuthGate {
    /// Create a gate from a verifier and a key source
    pub fn new(verifier: TokenVerifier, keys: Arc<dyn KeySource>) -> Self {
        Self { verifier, keys }
    }

    /// Create a gate that fetches keys from the configured JWKS endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn from_config(config: AuthConfig) -> Result<Self, ConfigError> {
        let client = JwksClient::from_config(&config)?;
        Ok(Self::new(
            TokenVerifier::new(Arc::new(config)),
            Arc::new(client),
        ))
    }

    /// The verifier in use
    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    /// Authorize a request for `required` permission.
    ///
    /// Returns the verified payload unchanged on success. Repeated calls
    /// with the same token give the same result until the token or its key
    /// expires.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthFailure`] carrying the failing step's code,
    /// description and status. Unexpected errors are reported as
    /// `unauthorized` (401).
    pub async fn authorize(
        &self,
        required: &str,
        headers: &HeaderMap,
    ) -> Result<DecodedPayload, AuthFailure> {
        match self.run(required, headers).await {
            Ok(payload) => {
                debug!(
                    permission = required,
                    subject = ?payload.subject(),
                    stage = %AuthStage::PermissionGranted,
                    "Request authorized"
                );
                Ok(payload)
            }
            Err(error) => {
                let failure = AuthFailure::from(error.clone());
                if let AuthError::Unexpected(detail) = &error {
                    error!(permission = required, error = %detail, "Unexpected verification error");
                }
                warn!(
                    permission = required,
                    stage = %failure.stage(),
                    code = failure.code(),
                    status = failure.status().as_u16(),
                    error = %error,
                    "Authorization failed"
                );
                Err(failure)
            }
        }
    }

    async fn run(&self, required: &str, headers: &HeaderMap) -> Result<DecodedPayload, AuthError> {
        let token = extract_bearer_token(headers)?;
        let keys = self.keys.fetch_keys().await?;
        let payload = self.verifier.verify(token.as_str(), &keys)?;
        check_permission(required, &payload)?;
        Ok(payload)
    }
}
