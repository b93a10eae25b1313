use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::pricing::{PricingTier, SimulatedPriceCatalog};
use crate::catalog::recipes::StaticRecipeCatalog;
use crate::catalog::stores::StoreDirectory;
use crate::catalog::{PriceCatalog, RecipeCatalog};
use crate::domain::ingredient::{Ingredient, IngredientName};
use crate::domain::plan::{Fulfillment, OptimizedPlan, PlanStrategy};
use crate::domain::quote::PriceQuote;
use crate::errors::{CatalogError, PlanningError};
use crate::optimizer::{OptimizeRequest, Optimizer, PlanOptimizer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningOptions {
    pub max_stores: usize,
    pub budget: Option<Decimal>,
    pub tier: PricingTier,
}

impl Default for PlanningOptions {
    fn default() -> Self {
        Self { max_stores: 3, budget: None, tier: PricingTier::MidRange }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShoppingReport {
    pub food_item: String,
    pub tier: PricingTier,
    pub ingredients_needed: Vec<Ingredient>,
    pub outcome: OptimizedPlan,
    /// Every quote gathered, ingredient-major in store directory order.
    pub all_store_options: Vec<PriceQuote>,
}

impl ShoppingReport {
    pub fn ingredient(&self, name: &IngredientName) -> Option<&Ingredient> {
        self.ingredients_needed.iter().find(|ingredient| &ingredient.name == name)
    }
}

/// Resolves a food item to ingredients, prices them at every store and hands
/// the quotes to the optimizer.
pub struct ShoppingPlanner<R, P, O = Optimizer> {
    recipes: R,
    prices: P,
    stores: StoreDirectory,
    optimizer: O,
}

impl ShoppingPlanner<StaticRecipeCatalog, SimulatedPriceCatalog, Optimizer> {
    pub fn bundled(price_seed: Option<u64>, optimizer: Optimizer) -> Result<Self, CatalogError> {
        Ok(Self::new(
            StaticRecipeCatalog::bundled()?,
            SimulatedPriceCatalog::bundled(price_seed)?,
            StoreDirectory::bundled()?,
            optimizer,
        ))
    }
}

impl<R, P, O> ShoppingPlanner<R, P, O>
where
    R: RecipeCatalog,
    P: PriceCatalog,
    O: PlanOptimizer,
{
    pub fn new(recipes: R, prices: P, stores: StoreDirectory, optimizer: O) -> Self {
        Self { recipes, prices, stores, optimizer }
    }

    pub fn plan(
        &self,
        food_item: &str,
        options: &PlanningOptions,
    ) -> Result<ShoppingReport, PlanningError> {
        if self.stores.is_empty() {
            return Err(PlanningError::NoStores);
        }

        let ingredients_needed = self.recipes.lookup(food_item);
        let mut all_store_options =
            Vec::with_capacity(ingredients_needed.len() * self.stores.len());
        let mut price_options: BTreeMap<IngredientName, Vec<PriceQuote>> = BTreeMap::new();
        for ingredient in &ingredients_needed {
            for store in self.stores.names() {
                let quote = self.prices.quote(ingredient, store, options.tier);
                price_options.entry(ingredient.name.clone()).or_default().push(quote.clone());
                all_store_options.push(quote);
            }
        }

        let request = OptimizeRequest {
            ingredients_needed: ingredients_needed.clone(),
            price_options,
            max_stores: options.max_stores,
            budget: options.budget,
        };
        let outcome = self.optimizer.optimize(&request)?;

        tracing::info!(
            event_name = "planner.plan.created",
            food_item,
            tier = options.tier.as_str(),
            ingredients = ingredients_needed.len(),
            stores_used = outcome.plan.store_count(),
            total_cost = %outcome.plan.total_cost,
            complete = matches!(outcome.fulfillment, Fulfillment::Complete),
            exhaustive = matches!(outcome.strategy, PlanStrategy::Exhaustive),
            "shopping plan created"
        );

        Ok(ShoppingReport {
            food_item: food_item.to_string(),
            tier: options.tier,
            ingredients_needed,
            outcome,
            all_store_options,
        })
    }
}
