use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::ingredient::IngredientName;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StoreName(pub String);

impl StoreName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StoreName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for StoreName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Price of one ingredient at one store. Prices are already rounded to cents
/// by whichever catalog produced the quote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub ingredient: IngredientName,
    pub store: StoreName,
    pub price: Decimal,
    pub location: Option<String>,
}

impl PriceQuote {
    pub fn new(ingredient: impl Into<String>, store: impl Into<String>, price: Decimal) -> Self {
        Self {
            ingredient: IngredientName(ingredient.into()),
            store: StoreName(store.into()),
            price,
            location: None,
        }
    }
}
