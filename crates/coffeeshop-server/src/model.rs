//! Drink catalog model and request bodies

use serde::{Deserialize, Serialize};

/// One ingredient of a recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Display color of the layer
    pub color: String,
    /// Ingredient name
    pub name: String,
    /// Relative amount
    pub parts: u32,
}

/// Ingredient with its name hidden, for the public menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortIngredient {
    pub color: String,
    pub parts: u32,
}

/// A drink on the menu
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Drink {
    pub id: u64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Public representation of a drink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortDrink {
    pub id: u64,
    pub title: String,
    pub recipe: Vec<ShortIngredient>,
}

impl Drink {
    /// Representation with ingredient names hidden
    pub fn short(&self) -> ShortDrink {
        ShortDrink {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|ingredient| ShortIngredient {
                    color: ingredient.color.clone(),
                    parts: ingredient.parts,
                })
                .collect(),
        }
    }
}

/// Recipe as sent by clients: a single ingredient or a list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RecipeInput {
    One(Ingredient),
    Many(Vec<Ingredient>),
}

impl From<RecipeInput> for Vec<Ingredient> {
    fn from(input: RecipeInput) -> Self {
        match input {
            RecipeInput::One(ingredient) => vec![ingredient],
            RecipeInput::Many(ingredients) => ingredients,
        }
    }
}

/// Body of `POST /drinks` and `PATCH /drinks/{id}`.
///
/// Both fields are optional at the parsing level. Creation requires both,
/// an update applies whichever are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DrinkPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub recipe: Option<RecipeInput>,
}

/// A drink to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDrink {
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

/// Fields to change on an existing drink
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrinkUpdate {
    pub title: Option<String>,
    pub recipe: Option<Vec<Ingredient>>,
}

impl DrinkPayload {
    /// Turn into a complete new drink, or `None` if the title is missing or
    /// blank, or the recipe is missing
    pub fn into_new_drink(self) -> Option<NewDrink> {
        let title = self.title.filter(|title| !title.trim().is_empty())?;
        let recipe = self.recipe?;
        Some(NewDrink {
            title,
            recipe: recipe.into(),
        })
    }

    /// Turn into a partial update, or `None` if a title is given but blank
    pub fn into_update(self) -> Option<DrinkUpdate> {
        if self.title.as_deref().is_some_and(|title| title.trim().is_empty()) {
            return None;
        }
        Some(DrinkUpdate {
            title: self.title,
            recipe: self.recipe.map(Into::into),
        })
    }
}
