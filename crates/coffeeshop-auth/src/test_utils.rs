//! Test utilities for token verification
//!
//! Fixed RSA key pairs, a matching configuration and a token signer, enabled
//! with the `test-utils` feature. These are for tests only: the private keys
//! are checked into the repository.

use std::time::{SystemTime, UNIX_EPOCH};

use http::header::AUTHORIZATION;
use http::{HeaderMap, HeaderValue};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Map, Value, json};

use crate::config::AuthConfig;
use crate::jwks::{KeyRecord, KeySet};

/// Key id of the primary test key
pub const TEST_KEY_ID: &str = "xyz";

/// Provider domain used by [`test_config`]
pub const TEST_DOMAIN: &str = "coffeeshop-test.us.auth0.com";

/// API audience used by [`test_config`]
pub const TEST_AUDIENCE: &str = "coffee";

/// Subject put in tokens built by [`claims`]
pub const TEST_SUBJECT: &str = "auth0|barista";

/// Private key matching [`test_key_record`]
pub const PRIMARY_KEY_PEM: &str = include_str!("../testdata/primary_key.pem");

/// Private key that is not published in any test key set
pub const ROGUE_KEY_PEM: &str = include_str!("../testdata/rogue_key.pem");

/// Base64url RSA modulus of [`PRIMARY_KEY_PEM`]
pub const PRIMARY_KEY_N: &str = "wdsEa3Y99AFYzI4ww6_9gfBqMewwV6xtmDj6DE_TLen9J6unXfo1hUlM2JHUD0Nm2jKXvbFSVOGpMoAZrXJucaO1cm8YKZIvhrrm-To5dLJk5mfvj20E12Ys_tPF7yjqUWos2Slc0j9gKG8z96wMHUCJbIoPakdgMK9w6S-NPYyYOHU8tZvPb_GJKnUyPIqyZ795wK6NaaD-gVFCpO8lYNWBMRFm2uRb6Twfm5Ie_CeUd8hvUwb1M-jHG5XDocha_82o0kfMHbKS0KHPqY7FV42Xzu6Jexl_NpWB7EjrKDsmf7rYhFxxoecpflnzlR-WTHr3T0TVIMLiqOlYcmsLoQ";

/// Base64url RSA modulus of [`ROGUE_KEY_PEM`]
pub const ROGUE_KEY_N: &str = "sXWC66HdQv5dGwVgMRxv_g_hU1usQbmX-ufeFdzsR_SGOEJr5okRqDgChTBffEFZ9eyURNkGb6MAt7__Tyw3K_X8Hq1eKvmVtOdX8w8HreZ_7rHwjcV5ooc4pCABU2zEUaYxIuYaRiwOILW_wA-3w3u8kAJzd9o8-JY2sY9LpFVlg_PMQ9gBjKlEG3Ov69Kwz9Kq9pqZmv0U3DQ7RRDl_w5pxgg5PeK-bm9eGFosTc-cXxmqa5KdF1j_5ZWk-CT6LHfHTb6patcSee7PVPsKncPwHJIAYZKwxx8nDJ5M5hC1fZxAucmLAgcwP4D5MCft3nZH404PqGSWXwh3e7UTVw";

/// Base64url RSA public exponent shared by both test keys (65537)
pub const TEST_KEY_E: &str = "AQAB";

/// Configuration for [`TEST_DOMAIN`] and [`TEST_AUDIENCE`]
pub fn test_config() -> AuthConfig {
    AuthConfig::new(TEST_DOMAIN, TEST_AUDIENCE)
}

/// Public record of the primary test key under [`TEST_KEY_ID`]
pub fn test_key_record() -> KeyRecord {
    KeyRecord::rsa(TEST_KEY_ID, PRIMARY_KEY_N, TEST_KEY_E)
}

/// Key set holding only the primary test key
pub fn test_key_set() -> KeySet {
    KeySet::new(vec![test_key_record()])
}

/// Current Unix time in seconds
pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_secs() as i64
}

/// Claims accepted by [`test_config`], valid for an hour, granting
/// `permissions`
pub fn claims(permissions: &[&str]) -> Map<String, Value> {
    let now = now();
    let value = json!({
        "iss": format!("https://{TEST_DOMAIN}/"),
        "sub": TEST_SUBJECT,
        "aud": TEST_AUDIENCE,
        "iat": now,
        "exp": now + 3600,
        "permissions": permissions,
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!("json! object literal"),
    }
}

fn sign_with(pem: &str, claims: &Map<String, Value>, kid: &str) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.typ = Some("JWT".to_string());
    header.kid = Some(kid.to_string());

    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).expect("Invalid RSA test key");
    encode(&header, claims, &key).expect("Failed to encode test JWT")
}

/// Sign `claims` with the primary test key, announcing `kid`
pub fn sign(claims: &Map<String, Value>, kid: &str) -> String {
    sign_with(PRIMARY_KEY_PEM, claims, kid)
}

/// Sign `claims` with a key that no test key set publishes
pub fn sign_with_rogue_key(claims: &Map<String, Value>, kid: &str) -> String {
    sign_with(ROGUE_KEY_PEM, claims, kid)
}

/// Headers carrying `Authorization: Bearer <token>`
pub fn bearer_headers(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}")).expect("Invalid header value"),
    );
    headers
}
