use rust_decimal::Decimal;

use crate::domain::money::round_to_cents;
use crate::domain::plan::{ShoppingPlan, StoreBasket};
use crate::domain::quote::PriceQuote;

/// Groups chosen quotes by store. Stores appear in first-use order and each
/// basket keeps the ingredients' processing order.
pub fn assemble_plan(picks: &[&PriceQuote]) -> ShoppingPlan {
    let mut shopping_list: Vec<StoreBasket> = Vec::new();
    let mut total_cost = Decimal::ZERO;

    for quote in picks {
        total_cost += quote.price;
        match shopping_list.iter_mut().find(|basket| basket.store == quote.store) {
            Some(basket) => {
                basket.subtotal += quote.price;
                basket.items.push((*quote).clone());
            }
            None => shopping_list.push(StoreBasket {
                store: quote.store.clone(),
                items: vec![(*quote).clone()],
                subtotal: quote.price,
            }),
        }
    }

    for basket in &mut shopping_list {
        basket.subtotal = round_to_cents(basket.subtotal);
    }

    ShoppingPlan {
        stores_used: shopping_list.iter().map(|basket| basket.store.clone()).collect(),
        total_cost: round_to_cents(total_cost),
        shopping_list,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::assemble_plan;
    use crate::domain::money::{cents, round_to_cents};
    use crate::domain::quote::{PriceQuote, StoreName};

    #[test]
    fn groups_by_store_in_first_appearance_order() {
        let quotes = [
            PriceQuote::new("Spaghetti", "Kroger", cents(199)),
            PriceQuote::new("Garlic", "Aldi", cents(74)),
            PriceQuote::new("Olive oil", "Kroger", cents(899)),
            PriceQuote::new("Salt", "Aldi", cents(149)),
        ];
        let picks = quotes.iter().collect::<Vec<_>>();

        let plan = assemble_plan(&picks);

        assert_eq!(plan.stores_used, vec![StoreName::from("Kroger"), StoreName::from("Aldi")]);
        let kroger = plan.basket(&StoreName::from("Kroger")).expect("kroger basket");
        let names = kroger.items.iter().map(|q| q.ingredient.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Spaghetti", "Olive oil"]);
        assert_eq!(kroger.subtotal, cents(1098));
        assert_eq!(plan.basket(&StoreName::from("Aldi")).map(|b| b.subtotal), Some(cents(223)));
    }

    #[test]
    fn total_cost_is_the_rounded_sum_of_every_quote() {
        let quotes = [
            PriceQuote::new("Ginger", "Target", Decimal::new(2_995, 3)),
            PriceQuote::new("Onion", "Target", Decimal::new(1_490, 3)),
        ];
        let picks = quotes.iter().collect::<Vec<_>>();

        let plan = assemble_plan(&picks);

        assert_eq!(plan.total_cost, cents(449));
        let summed: Decimal = plan.quotes().map(|quote| quote.price).sum();
        assert_eq!(plan.total_cost, round_to_cents(summed));
    }

    #[test]
    fn empty_selection_yields_empty_plan() {
        let plan = assemble_plan(&[]);

        assert!(plan.stores_used.is_empty());
        assert!(plan.shopping_list.is_empty());
        assert_eq!(plan.total_cost, Decimal::ZERO);
    }
}
