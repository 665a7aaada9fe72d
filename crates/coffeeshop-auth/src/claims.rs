//! Verified token payload

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Claims of a token that passed signature and claim validation.
///
/// Every claim the provider put in the token is kept, so business logic can
/// read custom claims as well as the registered ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecodedPayload(Map<String, Value>);

impl DecodedPayload {
    /// Wrap a claim map
    pub fn new(claims: Map<String, Value>) -> Self {
        Self(claims)
    }

    /// All claims
    pub fn claims(&self) -> &Map<String, Value> {
        &self.0
    }

    /// A single claim
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// `sub` claim
    pub fn subject(&self) -> Option<&str> {
        self.get("sub").and_then(Value::as_str)
    }

    /// `permissions` claim as strings.
    ///
    /// Returns `None` if the claim is absent or is not an array of strings.
    pub fn permissions(&self) -> Option<Vec<&str>> {
        self.get("permissions")?
            .as_array()?
            .iter()
            .map(Value::as_str)
            .collect()
    }

    /// Consume into the claim map
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for DecodedPayload {
    fn from(claims: Map<String, Value>) -> Self {
        Self(claims)
    }
}
