//! Shared application state

use std::sync::Arc;

use coffeeshop_auth::AuthGate;

use crate::store::DrinkStore;

/// State handed to every route handler
#[derive(Debug, Clone)]
pub struct AppState {
    /// Authorization gate for protected routes
    pub gate: AuthGate,
    /// Drink catalog
    pub store: Arc<dyn DrinkStore>,
}

impl AppState {
    /// Bundle the gate and store for the router
    pub fn new(gate: AuthGate, store: Arc<dyn DrinkStore>) -> Self {
        Self { gate, store }
    }
}
