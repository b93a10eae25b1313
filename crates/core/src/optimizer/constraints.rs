use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::quote::{PriceQuote, StoreName};

/// Spending ceiling of a request. A missing budget is `Unbounded`, which admits
/// every total and contributes nothing to utilization scoring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum BudgetCeiling {
    Unbounded,
    Limit(Decimal),
}

impl BudgetCeiling {
    pub fn from_option(budget: Option<Decimal>) -> Self {
        budget.map_or(Self::Unbounded, Self::Limit)
    }

    pub fn limit(&self) -> Option<Decimal> {
        match self {
            Self::Unbounded => None,
            Self::Limit(amount) => Some(*amount),
        }
    }

    pub fn admits(&self, total: Decimal) -> bool {
        match self {
            Self::Unbounded => true,
            Self::Limit(amount) => total <= *amount,
        }
    }

    /// `total / limit`, or `None` when unbounded or the limit is not positive.
    pub fn utilization(&self, total: Decimal) -> Option<Decimal> {
        match self {
            Self::Limit(amount) if *amount > Decimal::ZERO => total.checked_div(*amount),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanConstraints {
    pub max_stores: usize,
    pub budget: BudgetCeiling,
}

impl PlanConstraints {
    pub fn admits(&self, metrics: &CombinationMetrics) -> bool {
        metrics.store_count <= self.max_stores && self.budget.admits(metrics.total_cost)
    }
}

/// Aggregates the scorer and the feasibility filter look at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CombinationMetrics {
    pub total_cost: Decimal,
    pub store_count: usize,
}

impl CombinationMetrics {
    /// `stores` is scratch space, cleared on entry so one buffer serves a
    /// whole enumeration.
    pub fn of<'q>(
        quotes: impl IntoIterator<Item = &'q PriceQuote>,
        stores: &mut Vec<&'q StoreName>,
    ) -> Self {
        stores.clear();
        let mut total_cost = Decimal::ZERO;
        for quote in quotes {
            total_cost += quote.price;
            if !stores.contains(&&quote.store) {
                stores.push(&quote.store);
            }
        }

        Self { total_cost, store_count: stores.len() }
    }
}
