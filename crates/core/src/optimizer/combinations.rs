//! Lazy enumeration of every ingredient -> quote assignment.
//!
//! Enumeration is depth-first and leftmost-first: the first ingredient's first
//! quote is held while every choice for the remaining ingredients is visited,
//! so the last ingredient varies fastest. The position vector of a combination
//! therefore sorts lexicographically in exactly the order combinations are
//! produced, which is what tie-breaking relies on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::ingredient::IngredientName;
use crate::domain::quote::PriceQuote;

/// Candidate quotes per ingredient, aligned with the request's ingredient order.
#[derive(Clone, Debug, Default)]
pub struct OptionTable<'a> {
    ingredients: Vec<&'a IngredientName>,
    options: Vec<&'a [PriceQuote]>,
}

impl<'a> OptionTable<'a> {
    pub fn new(rows: Vec<(&'a IngredientName, &'a [PriceQuote])>) -> Self {
        let (ingredients, options): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
        Self { ingredients, options }
    }

    pub fn len(&self) -> usize {
        self.ingredients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }

    pub fn ingredients(&self) -> &[&'a IngredientName] {
        &self.ingredients
    }

    pub fn options(&self, index: usize) -> &'a [PriceQuote] {
        self.options[index]
    }

    /// Quotes chosen by `position`, in ingredient order.
    pub fn quotes_at<'s>(
        &'s self,
        position: &'s [usize],
    ) -> impl Iterator<Item = &'a PriceQuote> + 's {
        position.iter().enumerate().map(move |(index, choice)| &self.options(index)[*choice])
    }

    /// Number of full combinations, or `None` when it does not fit in a `u64`.
    pub fn search_space(&self) -> Option<u64> {
        self.options
            .iter()
            .try_fold(1_u64, |acc, options| acc.checked_mul(options.len() as u64))
    }

    /// Splits the enumeration into disjoint sub-trees by fixing the leading
    /// ingredients' choices. Prefixes come back in canonical order and the
    /// smallest depth yielding at least `min_parts` prefixes is used.
    pub fn partition(&self, min_parts: usize) -> Vec<Vec<usize>> {
        let mut prefixes = vec![Vec::new()];
        for options in &self.options {
            if prefixes.len() >= min_parts {
                break;
            }
            prefixes = prefixes
                .into_iter()
                .flat_map(|prefix| {
                    (0..options.len()).map(move |choice| {
                        let mut next = prefix.clone();
                        next.push(choice);
                        next
                    })
                })
                .collect();
        }
        prefixes
    }
}

/// Shared stop signal. Cloning hands out another handle to the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Combination<'a> {
    position: Vec<usize>,
    quotes: Vec<&'a PriceQuote>,
}

impl<'a> Combination<'a> {
    pub fn at(table: &OptionTable<'a>, position: Vec<usize>) -> Self {
        let quotes = table.quotes_at(&position).collect();
        Self { position, quotes }
    }

    /// Index of the chosen quote for each ingredient.
    pub fn position(&self) -> &[usize] {
        &self.position
    }

    /// Chosen quotes in ingredient order.
    pub fn quotes(&self) -> &[&'a PriceQuote] {
        &self.quotes
    }
}

pub struct CombinationGenerator<'t, 'a> {
    table: &'t OptionTable<'a>,
    fixed: usize,
    cursor: Vec<usize>,
    done: bool,
    pending_advance: bool,
    cancel: CancelToken,
}

impl<'t, 'a> CombinationGenerator<'t, 'a> {
    pub fn new(table: &'t OptionTable<'a>) -> Self {
        Self::with_prefix(table, &[])
    }

    /// Enumerates only the sub-tree whose leading choices equal `prefix`.
    pub fn with_prefix(table: &'t OptionTable<'a>, prefix: &[usize]) -> Self {
        let fixed = prefix.len().min(table.len());
        let mut cursor = vec![0; table.len()];
        cursor[..fixed].copy_from_slice(&prefix[..fixed]);

        let done = prefix.len() > table.len()
            || (0..table.len()).any(|index| cursor[index] >= table.options(index).len());

        Self { table, fixed, cursor, done, pending_advance: false, cancel: CancelToken::new() }
    }

    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Steps to the next position without allocating. The slice is only
    /// valid until the following call.
    pub fn next_position(&mut self) -> Option<&[usize]> {
        if self.pending_advance {
            self.pending_advance = false;
            self.advance();
        }
        if self.done || self.cancel.is_cancelled() {
            return None;
        }

        self.pending_advance = true;
        Some(&self.cursor)
    }

    fn advance(&mut self) {
        let mut slot = self.cursor.len();
        while slot > self.fixed {
            slot -= 1;
            self.cursor[slot] += 1;
            if self.cursor[slot] < self.table.options(slot).len() {
                return;
            }
            self.cursor[slot] = 0;
        }
        self.done = true;
    }
}

impl<'t, 'a> Iterator for CombinationGenerator<'t, 'a> {
    type Item = Combination<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.table;
        let position = self.next_position()?.to_vec();
        Some(Combination::at(table, position))
    }
}
