use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::pricing::PricingTier;
use crate::domain::quote::StoreName;
use crate::errors::CatalogError;

const BUNDLED_PRICING: &str = include_str!("../../data/pricing.toml");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierMultipliers {
    pub budget: Decimal,
    pub mid_range: Decimal,
    pub premium: Decimal,
}

impl TierMultipliers {
    pub fn for_tier(&self, tier: PricingTier) -> Decimal {
        match tier {
            PricingTier::Budget => self.budget,
            PricingTier::MidRange => self.mid_range,
            PricingTier::Premium => self.premium,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreProfile {
    pub name: StoreName,
    pub locations: Vec<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    pub multipliers: TierMultipliers,
}

#[derive(Debug, Default, Deserialize)]
struct StoreTable {
    #[serde(default, rename = "store")]
    stores: Vec<StoreProfile>,
}

/// Stores a plan may visit, in the order quotes are requested from them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreDirectory {
    stores: Vec<StoreProfile>,
}

impl StoreDirectory {
    pub fn new(stores: Vec<StoreProfile>) -> Result<Self, CatalogError> {
        for (index, store) in stores.iter().enumerate() {
            if stores[..index].iter().any(|earlier| earlier.name == store.name) {
                return Err(CatalogError::Invalid {
                    table: "store",
                    message: format!("store `{}` is listed more than once", store.name),
                });
            }
            if store.locations.is_empty() {
                return Err(CatalogError::Invalid {
                    table: "store",
                    message: format!("store `{}` has no locations", store.name),
                });
            }
        }
        Ok(Self { stores })
    }

    pub fn bundled() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUNDLED_PRICING)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let table: StoreTable =
            toml::from_str(raw).map_err(|source| CatalogError::Parse { table: "store", source })?;
        Self::new(table.stores)
    }

    pub fn names(&self) -> impl Iterator<Item = &StoreName> {
        self.stores.iter().map(|store| &store.name)
    }

    pub fn get(&self, name: &StoreName) -> Option<&StoreProfile> {
        self.stores.iter().find(|store| &store.name == name)
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::StoreDirectory;
    use crate::catalog::pricing::PricingTier;
    use crate::domain::quote::StoreName;
    use crate::errors::CatalogError;

    #[test]
    fn bundled_directory_lists_six_stores_in_table_order() {
        let directory = StoreDirectory::bundled().expect("bundled stores parse");

        let names = directory.names().map(StoreName::as_str).collect::<Vec<_>>();
        assert_eq!(
            names,
            vec!["Walmart", "Target", "Whole Foods", "Kroger", "Trader Joe's", "Aldi"]
        );
    }

    #[test]
    fn multipliers_follow_the_requested_tier() {
        let directory = StoreDirectory::bundled().expect("bundled stores parse");
        let aldi = directory.get(&StoreName::from("Aldi")).expect("aldi profile");

        assert_eq!(aldi.multipliers.for_tier(PricingTier::Budget), Decimal::new(65, 2));
        assert_eq!(aldi.multipliers.for_tier(PricingTier::MidRange), Decimal::new(75, 2));
        assert_eq!(aldi.multipliers.for_tier(PricingTier::Premium), Decimal::new(85, 2));
        assert!(aldi.locations.contains(&"Southside".to_string()));
    }

    #[test]
    fn duplicate_store_names_are_rejected() {
        let raw = r#"
            [[store]]
            name = "Aldi"
            locations = ["Eastside"]
            multipliers = { budget = "0.65", mid_range = "0.75", premium = "0.85" }

            [[store]]
            name = "Aldi"
            locations = ["Southside"]
            multipliers = { budget = "0.65", mid_range = "0.75", premium = "0.85" }
        "#;

        let error = StoreDirectory::from_toml_str(raw).expect_err("duplicate must fail");

        assert!(matches!(error, CatalogError::Invalid { table: "store", .. }));
    }

    #[test]
    fn malformed_table_reports_parse_error() {
        let error = StoreDirectory::from_toml_str("[[store]]\nname = 4").expect_err("bad toml");

        assert!(matches!(error, CatalogError::Parse { table: "store", .. }));
    }
}
