use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::ingredient::IngredientName;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OptimizeError {
    #[error("max_stores must be at least 1, got {0}")]
    InvalidMaxStores(usize),
    #[error("budget must be greater than zero, got {0}")]
    NonPositiveBudget(Decimal),
    #[error("ingredient `{0}` is listed more than once")]
    DuplicateIngredient(IngredientName),
    #[error("no price options were supplied for ingredient `{0}`")]
    MissingPriceOptions(IngredientName),
    #[error("quote for `{quoted}` at `{store}` was supplied under ingredient `{expected}`")]
    MismatchedQuote { expected: IngredientName, quoted: IngredientName, store: String },
    #[error("quote for `{ingredient}` at `{store}` has a negative price")]
    NegativePrice { ingredient: IngredientName, store: String },
    #[error("{} ingredient(s) could not be covered within the budget", .missing_ingredients.len())]
    Infeasible { missing_ingredients: Vec<IngredientName> },
}

impl OptimizeError {
    pub fn is_invalid_request(&self) -> bool {
        !matches!(self, Self::Infeasible { .. })
    }

    pub fn user_safe_message(&self) -> String {
        match self {
            Self::InvalidMaxStores(_) => "Allow at least one store to shop at.".to_string(),
            Self::NonPositiveBudget(_) => {
                "Budget must be a positive amount, or leave it unset for no limit.".to_string()
            }
            Self::DuplicateIngredient(name) => {
                format!("Ingredient '{name}' appears more than once; list each ingredient once.")
            }
            Self::MissingPriceOptions(name) => {
                format!("No store has a price for '{name}'.")
            }
            Self::MismatchedQuote { expected, .. } => {
                format!("Price options for '{expected}' contain quotes for another ingredient.")
            }
            Self::NegativePrice { ingredient, store } => {
                format!("The price for '{ingredient}' at {store} is invalid.")
            }
            Self::Infeasible { missing_ingredients } => {
                let names = missing_ingredients
                    .iter()
                    .map(IngredientName::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("The budget does not cover: {names}.")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not parse {table} table: {source}")]
    Parse { table: &'static str, source: toml::de::Error },
    #[error("{table} table is invalid: {message}")]
    Invalid { table: &'static str, message: String },
    #[error("unsupported pricing tier `{0}` (expected budget|mid-range|premium)")]
    UnknownTier(String),
}

#[derive(Debug, Error)]
pub enum PlanningError {
    #[error(transparent)]
    Optimize(#[from] OptimizeError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("no stores are configured for pricing")]
    NoStores,
}

impl PlanningError {
    /// Stable class name used in structured CLI output.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Optimize(error) if error.is_invalid_request() => "invalid_request",
            Self::Optimize(_) => "infeasible",
            Self::Catalog(_) | Self::NoStores => "catalog",
        }
    }

    pub fn user_safe_message(&self) -> String {
        match self {
            Self::Optimize(error) => error.user_safe_message(),
            other => other.to_string(),
        }
    }
}
