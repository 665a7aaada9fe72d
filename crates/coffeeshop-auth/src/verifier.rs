//! Token signature and claim verification
//!
//! [`TokenVerifier::verify`] checks a compact JWT against a [`KeySet`] in a
//! fixed order:
//!
//! 1. Read the unverified header. The algorithm must be accepted and a `kid`
//!    must be present.
//! 2. Find the key with that `kid`.
//! 3. Verify the signature with the key's RSA components.
//! 4. Check `exp` (with the configured leeway), then `aud` and `iss`.
//!
//! Failing to even read the token is a 400. Reading it and finding it
//! invalid is a 401.

use std::sync::Arc;

use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Validation, decode, decode_header};
use serde_json::{Map, Value};
use tracing::debug;

use crate::claims::DecodedPayload;
use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::jwks::KeySet;

const REQUIRED_CLAIMS: [&str; 3] = ["exp", "aud", "iss"];

/// Verifies bearer tokens against the configured audience and issuer
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    config: Arc<AuthConfig>,
}

impl TokenVerifier {
    /// Create a verifier sharing the process-wide configuration
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self { config }
    }

    /// The configuration this verifier checks against
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidHeader`] if the token cannot be parsed or uses
    ///   an algorithm that is not accepted
    /// - [`AuthError::MissingKeyId`] if the header has no `kid`
    /// - [`AuthError::KeyNotFound`] if no key in `keys` has that `kid`
    /// - [`AuthError::InvalidSignature`] if the signature does not verify
    /// - [`AuthError::TokenExpired`] if `exp` has passed
    /// - [`AuthError::InvalidClaims`] if `aud` or `iss` do not match, or a
    ///   required claim is missing
    /// - [`AuthError::Unexpected`] if the matched key is unusable
    pub fn verify(&self, token: &str, keys: &KeySet) -> AuthResult<DecodedPayload> {
        let header = decode_header(token).map_err(|e| {
            debug!(error = %e, "Failed to decode token header");
            AuthError::InvalidHeader(e.to_string())
        })?;

        if !self.config.algorithms.contains(&header.alg) {
            debug!(algorithm = ?header.alg, allowed = ?self.config.algorithms, "Token algorithm not accepted");
            return Err(AuthError::InvalidHeader(format!(
                "algorithm {:?} not accepted",
                header.alg
            )));
        }

        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;

        let key = keys
            .find(&kid)
            .ok_or_else(|| AuthError::KeyNotFound { kid: kid.clone() })?
            .decoding_key()?;

        let mut validation = Validation::new(header.alg);
        validation.algorithms = self.config.algorithms.clone();
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&REQUIRED_CLAIMS);
        validation.leeway = self.config.leeway.as_secs();
        validation.validate_nbf = true;

        let data = decode::<Map<String, Value>>(token, &key, &validation).map_err(map_jwt_error)?;

        let payload = DecodedPayload::new(data.claims);
        debug!(
            kid = %kid,
            algorithm = ?header.alg,
            subject = ?payload.subject(),
            "Token verified"
        );

        Ok(payload)
    }
}

fn map_jwt_error(error: JwtError) -> AuthError {
    match error.kind() {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidAudience
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature
        | ErrorKind::MissingRequiredClaim(_) => AuthError::InvalidClaims(error.to_string()),
        ErrorKind::InvalidToken
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_) => AuthError::InvalidHeader(error.to_string()),
        _ => AuthError::Unexpected(error.to_string()),
    }
}
