use rust_decimal::Decimal;

use crate::domain::ingredient::IngredientName;
use crate::domain::quote::{PriceQuote, StoreName};
use crate::optimizer::combinations::OptionTable;
use crate::optimizer::constraints::PlanConstraints;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GreedySelection<'a> {
    /// Chosen quotes in ingredient order, skipping unassigned ingredients.
    pub picks: Vec<&'a PriceQuote>,
    pub unassigned: Vec<IngredientName>,
}

/// Single-pass assignment used when exhaustive search is empty or not attempted.
///
/// Per ingredient, in request order: the cheapest quote from a store already in
/// use wins, otherwise the cheapest quote overall opens a new store. When that
/// choice would overrun the budget, the cheapest affordable quote is taken
/// instead, and if nothing is affordable the ingredient stays unassigned. A new
/// store can only be opened while fewer than `max_stores` are in use.
pub fn greedy_assign<'a>(
    table: &OptionTable<'a>,
    constraints: &PlanConstraints,
) -> GreedySelection<'a> {
    let mut selection = GreedySelection::default();
    let mut used: Vec<&'a StoreName> = Vec::new();
    let mut running_total = Decimal::ZERO;

    for (index, ingredient) in table.ingredients().iter().enumerate() {
        let mut sorted = table.options(index).iter().collect::<Vec<_>>();
        sorted.sort_by(|left, right| left.price.cmp(&right.price));

        let eligible = |quote: &PriceQuote| is_eligible(quote, &used, constraints.max_stores);
        let preferred = sorted
            .iter()
            .copied()
            .find(|quote| used.contains(&&quote.store))
            .or_else(|| sorted.iter().copied().find(|quote| eligible(*quote)));

        let chosen = preferred.and_then(|quote| {
            if constraints.budget.admits(running_total + quote.price) {
                return Some(quote);
            }
            sorted.iter().copied().find(|candidate| {
                eligible(*candidate) && constraints.budget.admits(running_total + candidate.price)
            })
        });

        match chosen {
            Some(quote) => {
                if !used.contains(&&quote.store) {
                    used.push(&quote.store);
                }
                running_total += quote.price;
                selection.picks.push(quote);
            }
            None => selection.unassigned.push((*ingredient).clone()),
        }
    }

    selection
}

fn is_eligible(quote: &PriceQuote, used: &[&StoreName], max_stores: usize) -> bool {
    used.contains(&&quote.store) || used.len() < max_stores
}
