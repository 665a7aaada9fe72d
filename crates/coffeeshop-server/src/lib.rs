//! # Coffee Shop Server - Drinks REST API
//!
//! Serves the drink menu over HTTP. Listing the menu is public; reading
//! recipes and changing the menu require the matching permission in the
//! caller's bearer token, checked by [`coffeeshop_auth::AuthGate`].
//!
//! - [`routes`] - Axum router and handlers
//! - [`store`] - [`DrinkStore`] trait and the in-memory implementation
//! - [`model`] - Drinks, ingredients and request bodies
//! - [`error`] - [`ApiError`] and its JSON envelope
//! - [`config`] - Command line and environment settings
//! - [`observability`] - Logging setup

pub mod config;
pub mod error;
pub mod model;
pub mod observability;
pub mod routes;
pub mod state;
pub mod store;

#[doc(inline)]
pub use config::{AuthArgs, ServerArgs};
#[doc(inline)]
pub use error::{ApiError, ApiResult};
#[doc(inline)]
pub use model::{Drink, Ingredient};
#[doc(inline)]
pub use routes::router;
#[doc(inline)]
pub use state::AppState;
#[doc(inline)]
pub use store::{DrinkStore, InMemoryDrinkStore, StoreError};
