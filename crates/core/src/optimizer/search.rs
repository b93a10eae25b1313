use std::cmp::Ordering as CmpOrdering;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::optimizer::combinations::{CancelToken, Combination, CombinationGenerator, OptionTable};
use crate::optimizer::constraints::{CombinationMetrics, PlanConstraints};
use crate::optimizer::scoring::ScoreStrategy;

const DEFAULT_MAX_SEARCH_SPACE: u64 = 2_000_000;
const DEFAULT_MAX_COMBINATIONS: u64 = 2_000_000;
const DEFAULT_TIME_BUDGET: Duration = Duration::from_millis(1_500);
const DEFAULT_PARALLEL_MIN_SEARCH_SPACE: u64 = 50_000;
const TIME_CHECK_INTERVAL: u64 = 1_024;
const PARTITIONS_PER_THREAD: usize = 4;

/// Bounds on exhaustive enumeration. Anything beyond them is handled by the
/// greedy fallback instead.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Largest cartesian product the optimizer will try to enumerate at all.
    pub max_search_space: u64,
    /// Combinations examined before enumeration is cancelled.
    pub max_combinations: u64,
    /// Wall-clock budget for enumeration.
    pub time_budget: Option<Duration>,
    pub parallel: bool,
    /// Smaller search spaces are always enumerated on the calling thread.
    pub parallel_min_search_space: u64,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_search_space: DEFAULT_MAX_SEARCH_SPACE,
            max_combinations: DEFAULT_MAX_COMBINATIONS,
            time_budget: Some(DEFAULT_TIME_BUDGET),
            parallel: true,
            parallel_min_search_space: DEFAULT_PARALLEL_MIN_SEARCH_SPACE,
        }
    }
}

impl SearchLimits {
    pub fn sequential() -> Self {
        Self { parallel: false, ..Self::default() }
    }

    pub fn admits_search_space(&self, search_space: Option<u64>) -> bool {
        search_space.is_some_and(|size| size <= self.max_search_space)
    }

    fn use_parallel(&self, search_space: u64) -> bool {
        self.parallel && search_space >= self.parallel_min_search_space
    }
}

#[derive(Clone, Debug)]
pub struct Candidate<'a> {
    pub score: Decimal,
    pub metrics: CombinationMetrics,
    pub combination: Combination<'a>,
}

impl<'a> Candidate<'a> {
    /// Lower score first, then earlier canonical position.
    fn rank(&self, other: &Self) -> CmpOrdering {
        self.score
            .cmp(&other.score)
            .then_with(|| self.combination.position().cmp(other.combination.position()))
    }
}

#[derive(Debug)]
pub enum SearchOutcome<'a> {
    Found { best: Candidate<'a>, examined: u64 },
    NoFeasible { examined: u64 },
    BudgetExceeded { examined: u64 },
}

struct StepBudget {
    started: Instant,
    max_combinations: u64,
    time_budget: Option<Duration>,
    examined: AtomicU64,
    cancel: CancelToken,
}

impl StepBudget {
    fn new(limits: &SearchLimits) -> Self {
        Self {
            started: Instant::now(),
            max_combinations: limits.max_combinations,
            time_budget: limits.time_budget,
            examined: AtomicU64::new(0),
            cancel: CancelToken::new(),
        }
    }

    /// Counts one examined combination; false once the budget is spent.
    fn record_step(&self) -> bool {
        let examined = self.examined.fetch_add(1, Ordering::Relaxed) + 1;
        if examined > self.max_combinations {
            self.cancel.cancel();
            return false;
        }
        if examined % TIME_CHECK_INTERVAL == 0 {
            if let Some(budget) = self.time_budget {
                if self.started.elapsed() > budget {
                    self.cancel.cancel();
                    return false;
                }
            }
        }
        true
    }

    fn examined(&self) -> u64 {
        self.examined.load(Ordering::Relaxed).min(self.max_combinations)
    }

    fn exceeded(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Enumerates `table`, keeping the best feasible combination.
pub fn exhaustive<'a>(
    table: &OptionTable<'a>,
    constraints: &PlanConstraints,
    strategy: &dyn ScoreStrategy,
    limits: &SearchLimits,
    search_space: u64,
) -> SearchOutcome<'a> {
    let budget = StepBudget::new(limits);

    let best = if limits.use_parallel(search_space) {
        let min_parts = rayon::current_num_threads().max(1) * PARTITIONS_PER_THREAD;
        table
            .partition(min_parts)
            .par_iter()
            .filter_map(|prefix| scan_subtree(table, prefix, constraints, strategy, &budget))
            .reduce_with(pick_better)
    } else {
        scan_subtree(table, &[], constraints, strategy, &budget)
    };

    let examined = budget.examined();
    if budget.exceeded() {
        return SearchOutcome::BudgetExceeded { examined };
    }

    match best {
        Some(best) => SearchOutcome::Found { best, examined },
        None => SearchOutcome::NoFeasible { examined },
    }
}

fn scan_subtree<'a>(
    table: &OptionTable<'a>,
    prefix: &[usize],
    constraints: &PlanConstraints,
    strategy: &dyn ScoreStrategy,
    budget: &StepBudget,
) -> Option<Candidate<'a>> {
    let mut generator =
        CombinationGenerator::with_prefix(table, prefix).with_cancel_token(budget.cancel.clone());
    let mut stores = Vec::with_capacity(table.len());

    let mut best: Option<Candidate<'a>> = None;
    while let Some(position) = generator.next_position() {
        if !budget.record_step() {
            break;
        }

        let metrics = CombinationMetrics::of(table.quotes_at(position), &mut stores);
        if !constraints.admits(&metrics) {
            continue;
        }

        let score = strategy.score(&metrics, constraints);
        // strict: the earliest combination keeps a tied score
        if best.as_ref().map_or(true, |current| score < current.score) {
            let combination = Combination::at(table, position.to_vec());
            best = Some(Candidate { score, metrics, combination });
        }
    }
    best
}

fn pick_better<'a>(left: Candidate<'a>, right: Candidate<'a>) -> Candidate<'a> {
    match right.rank(&left) {
        CmpOrdering::Less => right,
        _ => left,
    }
}
