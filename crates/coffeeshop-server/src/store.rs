//! Drink persistence
//!
//! Route handlers only talk to the [`DrinkStore`] trait. The bundled
//! [`InMemoryDrinkStore`] keeps the catalog in process memory.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::model::{Drink, DrinkUpdate, Ingredient, NewDrink};

/// Persistence error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No drink with that id
    #[error("Drink {id} not found")]
    NotFound {
        /// The requested id
        id: u64,
    },

    /// Another drink already uses that title
    #[error("A drink titled '{title}' already exists")]
    DuplicateTitle {
        /// The clashing title
        title: String,
    },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Drink catalog storage
#[async_trait]
pub trait DrinkStore: Send + Sync + fmt::Debug {
    /// All drinks ordered by id
    async fn list(&self) -> StoreResult<Vec<Drink>>;

    /// One drink by id
    async fn get(&self, id: u64) -> StoreResult<Drink>;

    /// Add a drink and return it with its assigned id
    async fn insert(&self, drink: NewDrink) -> StoreResult<Drink>;

    /// Apply a partial update and return the stored drink
    async fn update(&self, id: u64, update: DrinkUpdate) -> StoreResult<Drink>;

    /// Remove a drink and return its id
    async fn delete(&self, id: u64) -> StoreResult<u64>;
}

#[derive(Debug)]
struct Catalog {
    next_id: u64,
    drinks: BTreeMap<u64, Drink>,
}

impl Catalog {
    fn title_taken(&self, title: &str, except: Option<u64>) -> bool {
        self.drinks
            .values()
            .any(|drink| drink.title == title && Some(drink.id) != except)
    }
}

/// In-process drink store
#[derive(Debug)]
pub struct InMemoryDrinkStore {
    catalog: RwLock<Catalog>,
}

impl Default for InMemoryDrinkStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryDrinkStore {
    /// Create an empty store. Ids start at 1.
    pub fn new() -> Self {
        Self {
            catalog: RwLock::new(Catalog {
                next_id: 1,
                drinks: BTreeMap::new(),
            }),
        }
    }

    /// Create a store holding the sample `water` drink
    pub fn seeded() -> Self {
        let store = Self::new();
        store.seed();
        store
    }

    /// Insert the sample `water` drink unless a drink with that title exists
    pub fn seed(&self) {
        let mut catalog = self.catalog.write();
        if catalog.title_taken("water", None) {
            return;
        }
        let id = catalog.next_id;
        catalog.next_id += 1;
        catalog.drinks.insert(
            id,
            Drink {
                id,
                title: "water".to_string(),
                recipe: vec![Ingredient {
                    color: "blue".to_string(),
                    name: "water".to_string(),
                    parts: 1,
                }],
            },
        );
        debug!(id, "Seeded sample drink");
    }
}

#[async_trait]
impl DrinkStore for InMemoryDrinkStore {
    async fn list(&self) -> StoreResult<Vec<Drink>> {
        Ok(self.catalog.read().drinks.values().cloned().collect())
    }

    async fn get(&self, id: u64) -> StoreResult<Drink> {
        self.catalog
            .read()
            .drinks
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    async fn insert(&self, drink: NewDrink) -> StoreResult<Drink> {
        let mut catalog = self.catalog.write();
        if catalog.title_taken(&drink.title, None) {
            return Err(StoreError::DuplicateTitle { title: drink.title });
        }

        let id = catalog.next_id;
        catalog.next_id += 1;
        let drink = Drink {
            id,
            title: drink.title,
            recipe: drink.recipe,
        };
        catalog.drinks.insert(id, drink.clone());
        Ok(drink)
    }

    async fn update(&self, id: u64, update: DrinkUpdate) -> StoreResult<Drink> {
        let mut catalog = self.catalog.write();
        if !catalog.drinks.contains_key(&id) {
            return Err(StoreError::NotFound { id });
        }
        if let Some(title) = &update.title
            && catalog.title_taken(title, Some(id))
        {
            return Err(StoreError::DuplicateTitle {
                title: title.clone(),
            });
        }

        let drink = catalog
            .drinks
            .get_mut(&id)
            .ok_or(StoreError::NotFound { id })?;
        if let Some(title) = update.title {
            drink.title = title;
        }
        if let Some(recipe) = update.recipe {
            drink.recipe = recipe;
        }
        Ok(drink.clone())
    }

    async fn delete(&self, id: u64) -> StoreResult<u64> {
        self.catalog
            .write()
            .drinks
            .remove(&id)
            .map(|drink| drink.id)
            .ok_or(StoreError::NotFound { id })
    }
}
