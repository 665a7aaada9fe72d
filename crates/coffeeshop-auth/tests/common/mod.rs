//! Shared helpers for integration tests
//!
//! [`MockIdentityProvider`] serves a JWKS document from a local wiremock
//! server so the full gate, including the HTTP key fetch, can be exercised.

#![allow(dead_code)]

use std::time::Duration;

use coffeeshop_auth::test_utils::{test_config, test_key_set};
use coffeeshop_auth::{AuthConfig, KeySet};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const JWKS_PATH: &str = "/.well-known/jwks.json";

/// Identity provider stand-in publishing signing keys over HTTP
pub struct MockIdentityProvider {
    pub server: MockServer,
    pub jwks_endpoint: String,
}

impl MockIdentityProvider {
    /// Start an empty provider
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let jwks_endpoint = format!("{}{}", server.uri(), JWKS_PATH);
        Self {
            server,
            jwks_endpoint,
        }
    }

    /// Start a provider publishing the primary test key
    pub async fn with_test_keys() -> Self {
        let provider = Self::start().await;
        provider.mock_jwks(&test_key_set()).await;
        provider
    }

    /// Test configuration pointed at this provider's JWKS endpoint
    pub fn config(&self) -> AuthConfig {
        test_config().with_jwks_uri(&self.jwks_endpoint)
    }

    /// Serve `keys` on every request
    pub async fn mock_jwks(&self, keys: &KeySet) {
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(keys))
            .mount(&self.server)
            .await;
    }

    /// Serve `keys` and assert the endpoint is hit exactly `times` times
    pub async fn mock_jwks_expecting(&self, keys: &KeySet, times: u64) {
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(keys))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Answer with a bare status code
    pub async fn mock_jwks_status(&self, status: u16) {
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Answer 200 with a raw body
    pub async fn mock_jwks_raw(&self, body: &str) {
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/json")
                    .set_body_string(body),
            )
            .mount(&self.server)
            .await;
    }

    /// Serve `keys` after a delay
    pub async fn mock_jwks_delayed(&self, keys: &KeySet, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(JWKS_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(keys)
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Number of requests the provider has seen
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or_default()
    }
}
