//! Scoring strategies for feasible combinations (lower is better)

use rust_decimal::Decimal;

use crate::optimizer::constraints::{CombinationMetrics, PlanConstraints};

/// Turns a feasible combination's metrics into a comparable score.
pub trait ScoreStrategy: Send + Sync {
    fn score(&self, metrics: &CombinationMetrics, constraints: &PlanConstraints) -> Decimal;
}

/// Weights for the cost / variety / budget-utilization scalarization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringWeights {
    /// Subtracted once per distinct store, capped at max_stores (default: 30)
    pub store_variety_bonus: Decimal,
    /// Utilization band rewarded with `utilization_bonus` (default: 0.70..=0.95)
    pub target_utilization_low: Decimal,
    pub target_utilization_high: Decimal,
    /// Subtracted inside the target band (default: 80)
    pub utilization_bonus: Decimal,
    /// Below this ratio the plan is under-spending (default: 0.50)
    pub underuse_threshold: Decimal,
    pub underuse_penalty: Decimal,
    /// Above this ratio the plan cuts it too close (default: 0.98)
    pub tight_threshold: Decimal,
    pub tight_penalty: Decimal,
    /// Applied to totals over budget; feasibility filtering normally rules these out
    pub over_budget_penalty: Decimal,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            store_variety_bonus: Decimal::from(30),
            target_utilization_low: Decimal::new(70, 2),
            target_utilization_high: Decimal::new(95, 2),
            utilization_bonus: Decimal::from(80),
            underuse_threshold: Decimal::new(50, 2),
            underuse_penalty: Decimal::from(40),
            tight_threshold: Decimal::new(98, 2),
            tight_penalty: Decimal::from(20),
            over_budget_penalty: Decimal::from(1000),
        }
    }
}

/// `total_cost + variety_bonus + budget_penalty`.
#[derive(Debug, Clone, Default)]
pub struct VarietyBudgetScore {
    weights: ScoringWeights,
}

impl VarietyBudgetScore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn variety_bonus(&self, store_count: usize, max_stores: usize) -> Decimal {
        let rewarded = store_count.min(max_stores);
        -self.weights.store_variety_bonus * Decimal::from(rewarded as u64)
    }

    pub fn budget_penalty(&self, total_cost: Decimal, constraints: &PlanConstraints) -> Decimal {
        let Some(limit) = constraints.budget.limit() else {
            return Decimal::ZERO;
        };
        if total_cost > limit {
            return self.weights.over_budget_penalty;
        }
        let Some(ratio) = constraints.budget.utilization(total_cost) else {
            return Decimal::ZERO;
        };

        let weights = &self.weights;
        if ratio >= weights.target_utilization_low && ratio <= weights.target_utilization_high {
            -weights.utilization_bonus
        } else if ratio < weights.underuse_threshold {
            weights.underuse_penalty
        } else if ratio > weights.tight_threshold {
            weights.tight_penalty
        } else {
            Decimal::ZERO
        }
    }
}

impl ScoreStrategy for VarietyBudgetScore {
    fn score(&self, metrics: &CombinationMetrics, constraints: &PlanConstraints) -> Decimal {
        metrics.total_cost
            + self.variety_bonus(metrics.store_count, constraints.max_stores)
            + self.budget_penalty(metrics.total_cost, constraints)
    }
}

/// Cheapest feasible plan wins; store variety and utilization are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowestCostScore;

impl ScoreStrategy for LowestCostScore {
    fn score(&self, metrics: &CombinationMetrics, _constraints: &PlanConstraints) -> Decimal {
        metrics.total_cost
    }
}
