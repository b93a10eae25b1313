use serde::{Deserialize, Serialize};

use crate::catalog::RecipeCatalog;
use crate::domain::ingredient::Ingredient;
use crate::errors::CatalogError;

const BUNDLED_RECIPES: &str = include_str!("../../data/recipes.toml");

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Deserialize)]
struct RecipeTable {
    generic: Vec<Ingredient>,
    #[serde(default, rename = "recipe")]
    recipes: Vec<Recipe>,
}

#[derive(Clone, Debug)]
pub struct StaticRecipeCatalog {
    recipes: Vec<Recipe>,
    generic: Vec<Ingredient>,
}

impl StaticRecipeCatalog {
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUNDLED_RECIPES)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let table: RecipeTable = toml::from_str(raw)
            .map_err(|source| CatalogError::Parse { table: "recipes", source })?;

        if table.generic.is_empty() {
            return Err(CatalogError::Invalid {
                table: "recipes",
                message: "generic ingredient set is empty".to_string(),
            });
        }
        if let Some(recipe) = table.recipes.iter().find(|recipe| recipe.ingredients.is_empty()) {
            return Err(CatalogError::Invalid {
                table: "recipes",
                message: format!("recipe `{}` has no ingredients", recipe.name),
            });
        }

        let recipes = table
            .recipes
            .into_iter()
            .map(|recipe| Recipe { name: recipe.name.to_lowercase(), ..recipe })
            .collect();
        Ok(Self { recipes, generic: table.generic })
    }

    pub fn known_recipes(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    pub fn generic(&self) -> &[Ingredient] {
        &self.generic
    }

    /// Longest recipe name contained in the query, else the first recipe
    /// sharing a word with it.
    pub fn find(&self, food_item: &str) -> Option<&Recipe> {
        let query = food_item.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        let contained = self
            .recipes
            .iter()
            .filter(|recipe| query.contains(recipe.name.as_str()))
            .fold(None::<&Recipe>, |best, recipe| match best {
                Some(best) if best.name.len() >= recipe.name.len() => Some(best),
                _ => Some(recipe),
            });
        if contained.is_some() {
            return contained;
        }

        let words = query.split_whitespace().collect::<Vec<_>>();
        self.recipes
            .iter()
            .find(|recipe| recipe.name.split_whitespace().any(|word| words.contains(&word)))
    }
}

impl RecipeCatalog for StaticRecipeCatalog {
    fn lookup(&self, food_item: &str) -> Vec<Ingredient> {
        match self.find(food_item) {
            Some(recipe) => recipe.ingredients.clone(),
            None => self.generic.clone(),
        }
    }
}
