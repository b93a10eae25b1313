pub mod assembler;
pub mod combinations;
pub mod constraints;
pub mod greedy;
pub mod scoring;
pub mod search;

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::ingredient::{Ingredient, IngredientName};
use crate::domain::plan::{FallbackReason, Fulfillment, OptimizedPlan, PlanStrategy};
use crate::domain::quote::PriceQuote;
use crate::errors::OptimizeError;

use self::{
    assembler::assemble_plan,
    combinations::OptionTable,
    constraints::{BudgetCeiling, PlanConstraints},
    greedy::greedy_assign,
    scoring::{ScoreStrategy, VarietyBudgetScore},
    search::{SearchLimits, SearchOutcome},
};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizeRequest {
    pub ingredients_needed: Vec<Ingredient>,
    /// Candidate quotes per ingredient, one per store, in catalog order.
    pub price_options: BTreeMap<IngredientName, Vec<PriceQuote>>,
    pub max_stores: usize,
    /// `None` means no spending ceiling.
    pub budget: Option<Decimal>,
}

pub trait PlanOptimizer: Send + Sync {
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizedPlan, OptimizeError>;
}

pub struct Optimizer<S = VarietyBudgetScore> {
    strategy: S,
    limits: SearchLimits,
}

impl Default for Optimizer<VarietyBudgetScore> {
    fn default() -> Self {
        Self::new(VarietyBudgetScore::default(), SearchLimits::default())
    }
}

impl<S: ScoreStrategy> Optimizer<S> {
    pub fn new(strategy: S, limits: SearchLimits) -> Self {
        Self { strategy, limits }
    }

    fn run(&self, request: &OptimizeRequest) -> Result<OptimizedPlan, OptimizeError> {
        let (table, constraints) = prepare(request)?;
        let search_space = table.search_space();

        tracing::debug!(
            event_name = "optimizer.search.started",
            ingredients = table.len(),
            search_space = ?search_space,
            max_stores = constraints.max_stores,
            budget = ?constraints.budget.limit(),
            "starting plan search"
        );

        if !self.limits.admits_search_space(search_space) {
            return Ok(fall_back(&table, &constraints, FallbackReason::SearchSpaceTooLarge, 0));
        }

        let outcome = search::exhaustive(
            &table,
            &constraints,
            &self.strategy,
            &self.limits,
            search_space.unwrap_or_default(),
        );

        let plan = match outcome {
            SearchOutcome::Found { best, examined } => {
                tracing::debug!(
                    event_name = "optimizer.search.completed",
                    examined,
                    score = %best.score,
                    total_cost = %best.metrics.total_cost,
                    store_count = best.metrics.store_count,
                    "exhaustive search selected a plan"
                );
                OptimizedPlan {
                    plan: assemble_plan(best.combination.quotes()),
                    fulfillment: Fulfillment::Complete,
                    strategy: PlanStrategy::Exhaustive,
                    combinations_examined: examined,
                    score: Some(best.score),
                }
            }
            SearchOutcome::NoFeasible { examined } => {
                fall_back(&table, &constraints, FallbackReason::NoFeasibleCombination, examined)
            }
            SearchOutcome::BudgetExceeded { examined } => {
                fall_back(&table, &constraints, FallbackReason::SearchBudgetExceeded, examined)
            }
        };

        Ok(plan)
    }
}

impl<S: ScoreStrategy> PlanOptimizer for Optimizer<S> {
    fn optimize(&self, request: &OptimizeRequest) -> Result<OptimizedPlan, OptimizeError> {
        self.run(request)
    }
}

fn fall_back(
    table: &OptionTable<'_>,
    constraints: &PlanConstraints,
    reason: FallbackReason,
    examined: u64,
) -> OptimizedPlan {
    tracing::info!(
        event_name = "optimizer.fallback.engaged",
        reason = reason.as_str(),
        examined,
        "falling back to greedy assignment"
    );

    let selection = greedy_assign(table, constraints);
    let plan = assemble_plan(&selection.picks);
    let fulfillment = if selection.unassigned.is_empty() {
        Fulfillment::Complete
    } else {
        tracing::warn!(
            event_name = "optimizer.plan.partial",
            missing = selection.unassigned.len(),
            total_cost = %plan.total_cost,
            "plan leaves ingredients uncovered"
        );
        Fulfillment::Partial { missing_ingredients: selection.unassigned }
    };

    OptimizedPlan {
        plan,
        fulfillment,
        strategy: PlanStrategy::GreedyFallback { reason },
        combinations_examined: examined,
        score: None,
    }
}

/// Validates the request and lines up each ingredient with its quotes.
fn prepare(request: &OptimizeRequest) -> Result<(OptionTable<'_>, PlanConstraints), OptimizeError> {
    if request.max_stores < 1 {
        return Err(OptimizeError::InvalidMaxStores(request.max_stores));
    }
    if let Some(budget) = request.budget {
        if budget <= Decimal::ZERO {
            return Err(OptimizeError::NonPositiveBudget(budget));
        }
    }

    let mut seen = BTreeSet::new();
    let mut rows = Vec::with_capacity(request.ingredients_needed.len());
    for ingredient in &request.ingredients_needed {
        let name = &ingredient.name;
        if !seen.insert(name) {
            return Err(OptimizeError::DuplicateIngredient(name.clone()));
        }

        let options = request
            .price_options
            .get(name)
            .filter(|options| !options.is_empty())
            .ok_or_else(|| OptimizeError::MissingPriceOptions(name.clone()))?;

        for quote in options {
            if &quote.ingredient != name {
                return Err(OptimizeError::MismatchedQuote {
                    expected: name.clone(),
                    quoted: quote.ingredient.clone(),
                    store: quote.store.0.clone(),
                });
            }
            if quote.price < Decimal::ZERO {
                return Err(OptimizeError::NegativePrice {
                    ingredient: name.clone(),
                    store: quote.store.0.clone(),
                });
            }
        }

        rows.push((name, options.as_slice()));
    }

    let constraints = PlanConstraints {
        max_stores: request.max_stores,
        budget: BudgetCeiling::from_option(request.budget),
    };
    Ok((OptionTable::new(rows), constraints))
}
