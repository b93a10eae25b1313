pub mod pricing;
pub mod recipes;
pub mod stores;

use crate::domain::ingredient::Ingredient;
use crate::domain::quote::{PriceQuote, StoreName};

use self::pricing::PricingTier;

/// Resolves a free-text food item to the ingredients it needs.
pub trait RecipeCatalog: Send + Sync {
    fn lookup(&self, food_item: &str) -> Vec<Ingredient>;
}

/// Produces one quote per ingredient, store and tier. Prices are never below
/// the catalog's minimum.
pub trait PriceCatalog: Send + Sync {
    fn quote(&self, ingredient: &Ingredient, store: &StoreName, tier: PricingTier) -> PriceQuote;
}
