use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::ingredient::IngredientName;
use crate::domain::quote::{PriceQuote, StoreName};
use crate::errors::OptimizeError;

/// Quotes bought at a single store, in the order the ingredients were processed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreBasket {
    pub store: StoreName,
    pub items: Vec<PriceQuote>,
    pub subtotal: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingPlan {
    pub stores_used: Vec<StoreName>,
    pub total_cost: Decimal,
    pub shopping_list: Vec<StoreBasket>,
}

impl ShoppingPlan {
    pub fn store_count(&self) -> usize {
        self.stores_used.len()
    }

    pub fn basket(&self, store: &StoreName) -> Option<&StoreBasket> {
        self.shopping_list.iter().find(|basket| &basket.store == store)
    }

    pub fn quotes(&self) -> impl Iterator<Item = &PriceQuote> {
        self.shopping_list.iter().flat_map(|basket| basket.items.iter())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Fulfillment {
    Complete,
    Partial { missing_ingredients: Vec<IngredientName> },
}

impl Fulfillment {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NoFeasibleCombination,
    SearchSpaceTooLarge,
    SearchBudgetExceeded,
}

impl FallbackReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoFeasibleCombination => "no_feasible_combination",
            Self::SearchSpaceTooLarge => "search_space_too_large",
            Self::SearchBudgetExceeded => "search_budget_exceeded",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanStrategy {
    Exhaustive,
    GreedyFallback { reason: FallbackReason },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizedPlan {
    pub plan: ShoppingPlan,
    pub fulfillment: Fulfillment,
    pub strategy: PlanStrategy,
    pub combinations_examined: u64,
    /// Score of the winning combination; absent when the greedy pass chose the plan.
    pub score: Option<Decimal>,
}

impl OptimizedPlan {
    /// Turns a partial result into `OptimizeError::Infeasible` for callers that
    /// cannot act on an incomplete list.
    pub fn require_complete(self) -> Result<ShoppingPlan, OptimizeError> {
        match self.fulfillment {
            Fulfillment::Complete => Ok(self.plan),
            Fulfillment::Partial { missing_ingredients } => {
                Err(OptimizeError::Infeasible { missing_ingredients })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{FallbackReason, Fulfillment, OptimizedPlan, PlanStrategy, ShoppingPlan};
    use crate::domain::ingredient::IngredientName;
    use crate::errors::OptimizeError;

    #[test]
    fn outcome_tags_serialize_in_snake_case() {
        let fulfillment =
            Fulfillment::Partial { missing_ingredients: vec![IngredientName::from("Salmon")] };
        let strategy =
            PlanStrategy::GreedyFallback { reason: FallbackReason::SearchSpaceTooLarge };

        assert_eq!(
            serde_json::to_value(&fulfillment).ok(),
            Some(json!({ "status": "partial", "missing_ingredients": ["Salmon"] }))
        );
        assert_eq!(
            serde_json::to_value(strategy).ok(),
            Some(json!({ "kind": "greedy_fallback", "reason": "search_space_too_large" }))
        );
        assert_eq!(
            serde_json::to_value(PlanStrategy::Exhaustive).ok(),
            Some(json!({ "kind": "exhaustive" }))
        );
    }

    #[test]
    fn require_complete_rejects_partial_plans() {
        let outcome = OptimizedPlan {
            plan: ShoppingPlan::default(),
            fulfillment: Fulfillment::Partial {
                missing_ingredients: vec![IngredientName::from("Saffron")],
            },
            strategy: PlanStrategy::GreedyFallback {
                reason: FallbackReason::NoFeasibleCombination,
            },
            combinations_examined: 12,
            score: None,
        };

        assert_eq!(
            outcome.require_complete(),
            Err(OptimizeError::Infeasible {
                missing_ingredients: vec![IngredientName::from("Saffron")]
            })
        );
    }
}
