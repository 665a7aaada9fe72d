//! # Coffee Shop Auth - Bearer Token Authorization
//!
//! Verifies identity-provider-issued bearer tokens and enforces per-operation
//! permissions for the coffee shop API.
//!
//! ## Architecture
//!
//! - [`extract`] - Reads `Authorization: Bearer <token>` from request headers
//! - [`jwks`] - Fetches and caches the provider's JSON Web Key Set
//! - [`verifier`] - Checks signature, expiry, audience and issuer (RS256)
//! - [`permissions`] - Checks the `permissions` claim
//! - [`gate`] - Composes the above into one all-or-nothing [`AuthGate::authorize`]
//! - [`error`] - Failure taxonomy and the client-facing [`AuthFailure`]
//! - [`config`] - Immutable [`AuthConfig`] built once at process start
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use coffeeshop_auth::{AuthConfig, AuthGate};
//! use http::HeaderMap;
//!
//! # async fn handler(headers: HeaderMap) -> Result<(), Box<dyn std::error::Error>> {
//! let gate = AuthGate::from_config(AuthConfig::new("dev-example.us.auth0.com", "coffee"))?;
//!
//! match gate.authorize("get:drinks-detail", &headers).await {
//!     Ok(payload) => println!("authorized {:?}", payload.subject()),
//!     Err(failure) => println!("{} -> {}", failure.code(), failure.status()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `axum` (default) - `IntoResponse` for [`AuthFailure`]
//! - `test-utils` - Fixed RSA test keys and a token signer

pub mod claims;
pub mod config;
pub mod error;
pub mod extract;
pub mod gate;
pub mod jwks;
pub mod permissions;
pub mod verifier;

#[cfg(feature = "axum")]
mod response;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

#[doc(inline)]
pub use claims::DecodedPayload;
#[doc(inline)]
pub use config::{AuthConfig, ConfigError, parse_algorithms};
#[doc(inline)]
pub use error::{AuthError, AuthFailure, AuthResult};
#[doc(inline)]
pub use extract::{BearerToken, extract_bearer_token};
#[doc(inline)]
pub use gate::{AuthGate, AuthStage};
#[doc(inline)]
pub use jwks::{JwksClient, KeyRecord, KeySet, KeySource};
#[doc(inline)]
pub use permissions::check_permission;
#[doc(inline)]
pub use verifier::TokenVerifier;

pub use jsonwebtoken::Algorithm;
