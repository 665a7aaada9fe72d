//! Bearer token extraction from request headers

use std::fmt;

use http::HeaderMap;
use http::header::AUTHORIZATION;

use crate::error::{AuthError, AuthResult};

/// Raw compact JWT taken from an `Authorization: Bearer <token>` header.
///
/// The token is not decoded or validated here. `Debug` is redacted so a
/// token never ends up in logs by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a raw token string
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BearerToken").field(&"<redacted>").finish()
    }
}

/// Extract the bearer token from request headers.
///
/// The header value is split on whitespace and must yield exactly a
/// case-insensitive `Bearer` scheme followed by the token.
///
/// # Errors
///
/// - [`AuthError::MissingHeader`] if there is no `Authorization` header
/// - [`AuthError::MalformedHeader`] if the value is not valid visible ASCII,
///   uses another scheme, or does not split into exactly two parts
pub fn extract_bearer_token(headers: &HeaderMap) -> AuthResult<BearerToken> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader("Authorization header must be bearer token."))?;

    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        [] => Err(AuthError::MalformedHeader(
            "Authorization header must be bearer token.",
        )),
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => Err(AuthError::MalformedHeader(
            "Authorization header must start with \"Bearer\".",
        )),
        [_] => Err(AuthError::MalformedHeader("Token not found.")),
        [_, token] => Ok(BearerToken::new(*token)),
        _ => Err(AuthError::MalformedHeader(
            "Authorization header must be bearer token.",
        )),
    }
}
