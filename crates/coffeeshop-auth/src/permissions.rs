//! Permission checking

use crate::claims::DecodedPayload;
use crate::error::{AuthError, AuthResult};

/// Check that a verified payload grants `required`.
///
/// Returns `Ok(true)` when granted. A `permissions` claim that is absent or
/// not an array of strings is treated as missing.
///
/// # Errors
///
/// - [`AuthError::MissingPermissionsClaim`] if the payload has no usable
///   `permissions` claim
/// - [`AuthError::Forbidden`] if `required` is not listed
pub fn check_permission(required: &str, payload: &DecodedPayload) -> AuthResult<bool> {
    let permissions = payload
        .permissions()
        .ok_or(AuthError::MissingPermissionsClaim)?;

    if permissions.contains(&required) {
        Ok(true)
    } else {
        Err(AuthError::Forbidden {
            required: required.to_string(),
        })
    }
}
