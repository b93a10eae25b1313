pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod optimizer;
pub mod planner;

pub use catalog::pricing::{PriceModel, PricingTier, SimulatedPriceCatalog};
pub use catalog::recipes::{Recipe, StaticRecipeCatalog};
pub use catalog::stores::{StoreDirectory, StoreProfile, TierMultipliers};
pub use catalog::{PriceCatalog, RecipeCatalog};
pub use domain::ingredient::{Ingredient, IngredientName};
pub use domain::plan::{
    FallbackReason, Fulfillment, OptimizedPlan, PlanStrategy, ShoppingPlan, StoreBasket,
};
pub use domain::quote::{PriceQuote, StoreName};
pub use errors::{CatalogError, OptimizeError, PlanningError};
pub use optimizer::scoring::{LowestCostScore, ScoreStrategy, ScoringWeights, VarietyBudgetScore};
pub use optimizer::search::SearchLimits;
pub use optimizer::{OptimizeRequest, Optimizer, PlanOptimizer};
pub use planner::{PlanningOptions, ShoppingPlanner, ShoppingReport};
