//! Shared helpers for API integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use coffeeshop_auth::test_utils::{TEST_KEY_ID, claims, sign, test_config, test_key_set};
use coffeeshop_auth::{AuthGate, TokenVerifier};
use coffeeshop_server::{AppState, InMemoryDrinkStore, router};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

/// Every permission the API knows about
pub const ALL_PERMISSIONS: [&str; 4] = [
    "get:drinks-detail",
    "post:drinks",
    "patch:drinks",
    "delete:drinks",
];

/// App backed by the static test key set
pub fn app(store: InMemoryDrinkStore) -> Router {
    let gate = AuthGate::new(
        TokenVerifier::new(Arc::new(test_config())),
        Arc::new(test_key_set()),
    );
    router(AppState::new(gate, Arc::new(store)))
}

/// App with the sample drink already on the menu
pub fn seeded_app() -> Router {
    app(InMemoryDrinkStore::seeded())
}

/// Valid token granting `permissions`
pub fn token(permissions: &[&str]) -> String {
    sign(&claims(permissions), TEST_KEY_ID)
}

/// Token for the manager role
pub fn manager_token() -> String {
    token(&ALL_PERMISSIONS)
}

/// Token for the barista role
pub fn barista_token() -> String {
    token(&["get:drinks-detail"])
}

/// Response as seen by a client
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Request builder for the app under test
pub struct TestRequest {
    method: Method,
    uri: String,
    token: Option<String>,
    body: Option<String>,
    headers: Vec<(&'static str, String)>,
}

impl TestRequest {
    pub fn new(method: Method, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_string(),
            token: None,
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn post(uri: &str) -> Self {
        Self::new(Method::POST, uri)
    }

    pub fn patch(uri: &str) -> Self {
        Self::new(Method::PATCH, uri)
    }

    pub fn delete(uri: &str) -> Self {
        Self::new(Method::DELETE, uri)
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub fn raw_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self
    }

    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    pub async fn send(self, app: &Router) -> TestResponse {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        if let Some(token) = self.token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if self.body.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }
        let request = builder
            .body(self.body.map(Body::from).unwrap_or_else(Body::empty))
            .expect("valid request");

        let response = app.clone().oneshot(request).await.expect("infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
