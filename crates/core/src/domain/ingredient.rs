use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IngredientName(pub String);

impl IngredientName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IngredientName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for IngredientName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One line of a recipe. `quantity` is descriptive ("2 tbsp"), never parsed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: IngredientName,
    pub category: String,
    pub quantity: String,
}

impl Ingredient {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        quantity: impl Into<String>,
    ) -> Self {
        Self {
            name: IngredientName(name.into()),
            category: category.into(),
            quantity: quantity.into(),
        }
    }
}
