use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::stores::StoreDirectory;
use crate::catalog::PriceCatalog;
use crate::domain::ingredient::Ingredient;
use crate::domain::money::round_to_cents;
use crate::domain::quote::{PriceQuote, StoreName};
use crate::errors::CatalogError;

const BUNDLED_PRICING: &str = include_str!("../../data/pricing.toml");
const SEASONAL_CATEGORY: &str = "Produce";
/// Variation bounds in basis points of the tiered price.
const VARIATION_BPS: std::ops::RangeInclusive<i64> = 8_500..=11_500;
const SEASONAL_BPS: std::ops::RangeInclusive<i64> = 8_000..=13_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingTier {
    Budget,
    #[default]
    #[serde(alias = "mid-range")]
    MidRange,
    Premium,
}

impl PricingTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::MidRange => "mid_range",
            Self::Premium => "premium",
        }
    }
}

impl fmt::Display for PricingTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PricingTier {
    type Err = CatalogError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "budget" => Ok(Self::Budget),
            "mid-range" | "mid_range" | "midrange" => Ok(Self::MidRange),
            "premium" => Ok(Self::Premium),
            other => Err(CatalogError::UnknownTier(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientPrice {
    pub base: Decimal,
    pub category: String,
    pub unit: String,
}

/// Base prices before store and tier adjustments.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PriceModel {
    pub default_base_price: Decimal,
    pub minimum_price: Decimal,
    #[serde(default)]
    pub category_defaults: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub ingredients: BTreeMap<String, IngredientPrice>,
}

impl PriceModel {
    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUNDLED_PRICING)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let model: Self = toml::from_str(raw)
            .map_err(|source| CatalogError::Parse { table: "pricing", source })?;

        if model.minimum_price < Decimal::ZERO {
            return Err(CatalogError::Invalid {
                table: "pricing",
                message: format!("minimum_price must not be negative, got {}", model.minimum_price),
            });
        }
        if let Some((name, _)) =
            model.ingredients.iter().find(|(_, price)| price.base < Decimal::ZERO)
        {
            return Err(CatalogError::Invalid {
                table: "pricing",
                message: format!("base price for `{name}` must not be negative"),
            });
        }
        Ok(model)
    }

    /// Base price and pricing category: the ingredient's own entry, then its
    /// category default, then the global default.
    pub fn base_price<'m>(&'m self, ingredient: &'m Ingredient) -> (Decimal, &'m str) {
        if let Some(known) = self.ingredients.get(ingredient.name.as_str()) {
            return (known.base, known.category.as_str());
        }
        let base = self
            .category_defaults
            .get(&ingredient.category)
            .copied()
            .unwrap_or(self.default_base_price);
        (base, ingredient.category.as_str())
    }
}

/// Multiplicative price simulation: base price, store tier multiplier, a
/// +/-15% variation and a seasonal swing for produce, floored at the minimum.
pub struct SimulatedPriceCatalog {
    model: PriceModel,
    stores: StoreDirectory,
    rng: Mutex<StdRng>,
}

impl SimulatedPriceCatalog {
    /// `seed` makes every price sequence reproducible; `None` seeds from entropy.
    pub fn new(model: PriceModel, stores: StoreDirectory, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { model, stores, rng: Mutex::new(rng) }
    }

    pub fn bundled(seed: Option<u64>) -> Result<Self, CatalogError> {
        Ok(Self::new(PriceModel::bundled()?, StoreDirectory::bundled()?, seed))
    }
}

impl fmt::Debug for SimulatedPriceCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulatedPriceCatalog")
            .field("stores", &self.stores.len())
            .finish_non_exhaustive()
    }
}

impl PriceCatalog for SimulatedPriceCatalog {
    fn quote(&self, ingredient: &Ingredient, store: &StoreName, tier: PricingTier) -> PriceQuote {
        let (base, category) = self.model.base_price(ingredient);
        let profile = self.stores.get(store);
        let multiplier = profile.map_or(Decimal::ONE, |profile| profile.multipliers.for_tier(tier));

        let mut rng = match self.rng.lock() {
            Ok(rng) => rng,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut price = base * multiplier * Decimal::new(rng.gen_range(VARIATION_BPS), 4);
        if category == SEASONAL_CATEGORY {
            price *= Decimal::new(rng.gen_range(SEASONAL_BPS), 4);
        }
        let location = profile.and_then(|profile| profile.locations.choose(&mut *rng).cloned());

        PriceQuote {
            ingredient: ingredient.name.clone(),
            store: store.clone(),
            price: round_to_cents(price).max(self.model.minimum_price),
            location,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::{PriceModel, PricingTier, SimulatedPriceCatalog};
    use crate::catalog::stores::StoreDirectory;
    use crate::catalog::PriceCatalog;
    use crate::domain::ingredient::Ingredient;
    use crate::domain::money::cents;
    use crate::domain::quote::StoreName;
    use crate::errors::CatalogError;

    fn catalog(seed: u64) -> SimulatedPriceCatalog {
        SimulatedPriceCatalog::bundled(Some(seed)).expect("bundled pricing parses")
    }

    #[test]
    fn tier_parses_cli_and_config_spellings() {
        assert_eq!(PricingTier::from_str("mid-range").ok(), Some(PricingTier::MidRange));
        assert_eq!(PricingTier::from_str("MID_RANGE").ok(), Some(PricingTier::MidRange));
        assert_eq!(PricingTier::from_str(" premium ").ok(), Some(PricingTier::Premium));
        assert!(matches!(
            PricingTier::from_str("luxury"),
            Err(CatalogError::UnknownTier(ref tier)) if tier == "luxury"
        ));
    }

    #[test]
    fn base_price_falls_back_to_category_then_global_default() {
        let model = PriceModel::bundled().expect("bundled pricing parses");

        let known = Ingredient::new("Salmon", "Meat", "1 lb");
        let by_category = Ingredient::new("Duck breast", "Meat", "1 lb");
        let unknown = Ingredient::new("Mystery", "Frozen", "1 bag");

        assert_eq!(model.base_price(&known), (cents(1299), "Meat"));
        assert_eq!(model.base_price(&by_category), (cents(899), "Meat"));
        assert_eq!(model.base_price(&unknown), (cents(399), "Frozen"));
    }

    #[test]
    fn prices_stay_within_the_variation_band() {
        let catalog = catalog(11);
        let salmon = Ingredient::new("Salmon", "Meat", "1 lb");
        let store = StoreName::from("Whole Foods");
        // 12.99 * 1.8 premium multiplier
        let tiered = cents(1299) * Decimal::new(18, 1);

        for _ in 0..200 {
            let quote = catalog.quote(&salmon, &store, PricingTier::Premium);
            assert!(quote.price >= (tiered * Decimal::new(85, 2)).round_dp(2) - cents(1));
            assert!(quote.price <= (tiered * Decimal::new(115, 2)).round_dp(2) + cents(1));
            assert_eq!(quote.price, quote.price.round_dp(2));
            assert!(quote.location.is_some());
        }
    }

    #[test]
    fn produce_gets_the_seasonal_swing() {
        let catalog = catalog(3);
        let garlic = Ingredient::new("Garlic", "Produce", "4 cloves");
        let store = StoreName::from("Aldi");
        // 0.99 * 0.75 mid-range, widest band 0.85*0.80 ..= 1.15*1.30
        let tiered = cents(99) * Decimal::new(75, 2);

        for _ in 0..200 {
            let price = catalog.quote(&garlic, &store, PricingTier::MidRange).price;
            assert!(price >= cents(50));
            assert!(price <= (tiered * Decimal::new(1495, 3)).round_dp(2) + cents(1));
        }
    }

    #[test]
    fn cheap_items_never_drop_below_the_minimum_price() {
        let catalog = catalog(5);
        let salt = Ingredient::new("Salt", "Spices", "1 tsp");

        for _ in 0..100 {
            let quote = catalog.quote(&salt, &StoreName::from("Aldi"), PricingTier::Budget);
            assert!(quote.price >= cents(50));
        }
    }

    #[test]
    fn seeded_catalogs_produce_identical_sequences() {
        let first = catalog(42);
        let second = catalog(42);
        let pasta = Ingredient::new("Spaghetti", "Pantry", "1 lb");
        let store = StoreName::from("Kroger");

        for _ in 0..20 {
            assert_eq!(
                first.quote(&pasta, &store, PricingTier::MidRange),
                second.quote(&pasta, &store, PricingTier::MidRange)
            );
        }
    }

    #[test]
    fn unknown_store_uses_neutral_multiplier_without_location() {
        let catalog = SimulatedPriceCatalog::new(
            PriceModel::bundled().expect("bundled pricing parses"),
            StoreDirectory::default(),
            Some(1),
        );
        let rice = Ingredient::new("Rice", "Pantry", "2 cups");

        let quote = catalog.quote(&rice, &StoreName::from("Corner Shop"), PricingTier::Premium);

        assert_eq!(quote.location, None);
        assert_eq!(quote.store, StoreName::from("Corner Shop"));
    }

    #[test]
    fn negative_base_prices_are_rejected() {
        let raw = r#"
            default_base_price = "3.99"
            minimum_price = "0.50"

            [ingredients]
            "Rice" = { base = "-1.00", category = "Pantry", unit = "lb" }
        "#;

        let error = PriceModel::from_toml_str(raw).expect_err("negative base must fail");

        assert!(matches!(error, CatalogError::Invalid { table: "pricing", .. }));
    }
}
