//! Authorization error types
//!
//! [`AuthError`] is the typed failure every component of the gate returns.
//! [`AuthFailure`] is what the gate hands to the HTTP boundary: a
//! machine-readable code, a description that is safe to show to clients,
//! the status code to answer with and the verification stage that was
//! reached before the failure.

use http::StatusCode;
use serde_json::{Value, json};

use crate::gate::AuthStage;

/// Result type for authorization operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Typed failure raised by the extractor, key fetcher, verifier or
/// permission checker.
///
/// `Display` carries internal detail for logs. Use [`AuthError::description`]
/// for anything that leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header on the request
    #[error("Authorization header is missing")]
    MissingHeader,

    /// `Authorization` header present but not `Bearer <token>`
    #[error("Malformed authorization header: {0}")]
    MalformedHeader(&'static str),

    /// Token header carries no `kid`
    #[error("Token header has no key id")]
    MissingKeyId,

    /// Token cannot be parsed, or announces an algorithm we do not accept
    #[error("Unable to parse token: {0}")]
    InvalidHeader(String),

    /// Identity provider key set could not be fetched or parsed
    #[error("Key set fetch failed: {0}")]
    KeyFetch(String),

    /// No key in the key set matches the token's `kid`
    #[error("Key not found: {kid}")]
    KeyNotFound {
        /// The key id the token asked for
        kid: String,
    },

    /// Signature does not verify against the matched key
    #[error("Token signature is invalid")]
    InvalidSignature,

    /// `exp` is in the past
    #[error("Token is expired")]
    TokenExpired,

    /// `aud`, `iss` or another registered claim is wrong or missing
    #[error("Invalid claims: {0}")]
    InvalidClaims(String),

    /// Payload has no usable `permissions` claim
    #[error("Permissions claim missing or malformed")]
    MissingPermissionsClaim,

    /// Required permission is not granted by the token
    #[error("Permission '{required}' not granted")]
    Forbidden {
        /// The permission the operation requires
        required: String,
    },

    /// Anything else that went wrong during verification
    #[error("Unexpected verification error: {0}")]
    Unexpected(String),
}

impl AuthError {
    /// Machine-readable error code surfaced to clients
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingHeader | Self::Unexpected(_) => "unauthorized",
            Self::MalformedHeader(_)
            | Self::MissingKeyId
            | Self::InvalidHeader(_)
            | Self::KeyNotFound { .. } => "invalid_header",
            Self::KeyFetch(_) => "key_fetch_failed",
            Self::InvalidSignature => "invalid_signature",
            Self::TokenExpired => "token_expired",
            Self::InvalidClaims(_) | Self::MissingPermissionsClaim => "invalid_claims",
            Self::Forbidden { .. } => "forbidden",
        }
    }

    /// HTTP status code the boundary layer answers with
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingHeader
            | Self::MalformedHeader(_)
            | Self::MissingKeyId
            | Self::InvalidSignature
            | Self::TokenExpired
            | Self::InvalidClaims(_)
            | Self::Unexpected(_) => StatusCode::UNAUTHORIZED,
            Self::InvalidHeader(_) | Self::KeyNotFound { .. } | Self::MissingPermissionsClaim => {
                StatusCode::BAD_REQUEST
            }
            Self::KeyFetch(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
        }
    }

    /// Client-facing description, free of internal detail
    pub fn description(&self) -> &'static str {
        match self {
            Self::MissingHeader => "Authorization header is expected.",
            Self::MalformedHeader(reason) => *reason,
            Self::MissingKeyId => "Authorization malformed.",
            Self::InvalidHeader(_) => "Unable to parse authentication token.",
            Self::KeyFetch(_) => "Unable to fetch signing keys from the identity provider.",
            Self::KeyNotFound { .. } => "Unable to find the appropriate key.",
            Self::InvalidSignature => "Token signature is invalid.",
            Self::TokenExpired => "Token is expired.",
            Self::InvalidClaims(_) => "Incorrect claims. Please, check the audience and issuer.",
            Self::MissingPermissionsClaim => "Permissions not included in JWT.",
            Self::Forbidden { .. } => "Permission not found.",
            Self::Unexpected(_) => "Unauthorized action.",
        }
    }

    /// Last verification stage that succeeded before this error was raised
    pub fn stage_reached(&self) -> AuthStage {
        match self {
            Self::MissingHeader | Self::MalformedHeader(_) => AuthStage::Start,
            Self::MissingKeyId
            | Self::InvalidHeader(_)
            | Self::KeyFetch(_)
            | Self::KeyNotFound { .. }
            | Self::Unexpected(_) => AuthStage::HeaderExtracted,
            Self::InvalidSignature => AuthStage::KeyMatched,
            Self::TokenExpired | Self::InvalidClaims(_) => AuthStage::SignatureValid,
            Self::MissingPermissionsClaim | Self::Forbidden { .. } => AuthStage::ClaimsValid,
        }
    }
}

/// Structured failure produced by the authorization gate
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code} ({status}): {description}")]
pub struct AuthFailure {
    code: &'static str,
    description: String,
    status: StatusCode,
    stage: AuthStage,
}

impl AuthFailure {
    /// Build a failure from a sub-step error.
    ///
    /// Unexpected errors are normalized to the generic `unauthorized` failure
    /// so that no implementation detail leaks to the client.
    pub fn from_error(error: &AuthError, stage: AuthStage) -> Self {
        Self {
            code: error.code(),
            description: error.description().to_string(),
            status: error.status(),
            stage,
        }
    }

    /// The generic catch-all failure
    pub fn unauthorized(stage: AuthStage) -> Self {
        Self::from_error(&AuthError::Unexpected(String::new()), stage)
    }

    /// Machine-readable error code
    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Client-facing description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// HTTP status code to surface
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Last verification stage reached before failing
    pub fn stage(&self) -> AuthStage {
        self.stage
    }

    /// Wire body for this failure
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.status.as_u16(),
            "code": self.code,
            "description": self.description,
        })
    }

    /// `WWW-Authenticate` challenge for 401 responses
    pub fn www_authenticate(&self) -> Option<String> {
        (self.status == StatusCode::UNAUTHORIZED).then(|| {
            format!(
                "Bearer error=\"{}\", error_description=\"{}\"",
                self.code,
                self.description.replace('"', "'")
            )
        })
    }
}

impl From<AuthError> for AuthFailure {
    fn from(error: AuthError) -> Self {
        let stage = error.stage_reached();
        Self::from_error(&error, stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(AuthError::MissingHeader.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::MalformedHeader("x").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::MissingKeyId.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::InvalidHeader("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::KeyNotFound { kid: "abc".into() }.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::TokenExpired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::MissingPermissionsClaim.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::Forbidden {
                required: "post:drinks".into()
            }
            .status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::KeyFetch("down".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_unexpected_error_is_normalized() {
        let error = AuthError::Unexpected("RSA modulus is not base64url".into());
        let failure = AuthFailure::from(error);

        assert_eq!(failure.code(), "unauthorized");
        assert_eq!(failure.status(), StatusCode::UNAUTHORIZED);
        assert!(!failure.description().contains("base64"));
    }

    #[test]
    fn test_failure_json_envelope() {
        let failure = AuthFailure::from(AuthError::TokenExpired);
        let body = failure.to_json();

        assert_eq!(body["success"], false);
        assert_eq!(body["error"], 401);
        assert_eq!(body["code"], "token_expired");
        assert_eq!(body["description"], "Token is expired.");
    }

    #[test]
    fn test_www_authenticate_only_for_401() {
        let expired = AuthFailure::from(AuthError::TokenExpired);
        assert_eq!(
            expired.www_authenticate().as_deref(),
            Some("Bearer error=\"token_expired\", error_description=\"Token is expired.\"")
        );

        let forbidden = AuthFailure::from(AuthError::Forbidden {
            required: "delete:drinks".into(),
        });
        assert!(forbidden.www_authenticate().is_none());
    }

    #[test]
    fn test_stage_reached() {
        assert_eq!(AuthError::MissingHeader.stage_reached(), AuthStage::Start);
        assert_eq!(
            AuthError::InvalidSignature.stage_reached(),
            AuthStage::KeyMatched
        );
        assert_eq!(
            AuthError::TokenExpired.stage_reached(),
            AuthStage::SignatureValid
        );
        assert_eq!(
            AuthError::MissingPermissionsClaim.stage_reached(),
            AuthStage::ClaimsValid
        );
    }
}
