use std::path::PathBuf;
use std::str::FromStr;

use cartplan_core::config::{AppConfig, LoadOptions};
use cartplan_core::{
    Fulfillment, Optimizer, PlanStrategy, PlanningError, PlanningOptions, PricingTier,
    ShoppingPlanner, ShoppingReport, VarietyBudgetScore,
};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::{
    CommandResult, EXIT_CATALOG, EXIT_CONFIG, EXIT_INFEASIBLE, EXIT_INVALID_REQUEST,
};

const COMMAND: &str = "plan";
const RULE_WIDE: usize = 60;
const RULE_NARROW: usize = 40;

#[derive(Debug, Clone, Default, Args)]
pub struct PlanArgs {
    #[arg(help = "Dish or food item to shop for, e.g. \"chicken curry\"")]
    pub food_item: String,
    #[arg(long, help = "Maximum number of stores to visit (default from config)")]
    pub max_stores: Option<usize>,
    #[arg(long, help = "Spending ceiling in dollars; omit for no limit")]
    pub budget: Option<String>,
    #[arg(long, help = "Pricing tier: budget, mid-range or premium")]
    pub tier: Option<String>,
    #[arg(long, help = "Seed for reproducible simulated prices")]
    pub seed: Option<u64>,
    #[arg(long, help = "Fail instead of returning a partial plan")]
    pub require_complete: bool,
    #[arg(long, help = "Emit machine-readable JSON output")]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct PlanPayload<'a> {
    command: &'static str,
    status: &'static str,
    report: &'a ShoppingReport,
}

pub fn run(config_path: Option<PathBuf>, args: &PlanArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions { config_path, ..LoadOptions::default() }) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                error.to_string(),
                EXIT_CONFIG,
            )
        }
    };

    let options = match planning_options(&config, args) {
        Ok(options) => options,
        Err(message) => {
            return CommandResult::failure(
                COMMAND,
                "invalid_request",
                message,
                EXIT_INVALID_REQUEST,
            )
        }
    };

    let optimizer =
        Optimizer::new(VarietyBudgetScore::default(), config.optimizer.search_limits());
    let seed = args.seed.or(config.planner.price_seed);
    let planner = match ShoppingPlanner::bundled(seed, optimizer) {
        Ok(planner) => planner,
        Err(error) => {
            return CommandResult::failure(COMMAND, "catalog", error.to_string(), EXIT_CATALOG)
        }
    };

    let report = match planner.plan(&args.food_item, &options) {
        Ok(report) => report,
        Err(error) => return planning_failure(&error),
    };

    if args.require_complete {
        if let Err(error) = report.outcome.clone().require_complete() {
            return planning_failure(&PlanningError::from(error));
        }
    }

    if args.json {
        return CommandResult::success_with(&PlanPayload {
            command: COMMAND,
            status: "ok",
            report: &report,
        });
    }

    CommandResult::text(render_report(&report))
}

fn planning_failure(error: &PlanningError) -> CommandResult {
    let exit_code = match error.error_class() {
        "catalog" => EXIT_CATALOG,
        "infeasible" => EXIT_INFEASIBLE,
        _ => EXIT_INVALID_REQUEST,
    };
    CommandResult::failure(COMMAND, error.error_class(), error.user_safe_message(), exit_code)
}

fn planning_options(config: &AppConfig, args: &PlanArgs) -> Result<PlanningOptions, String> {
    let tier = match args.tier.as_deref() {
        Some(raw) => PricingTier::from_str(raw).map_err(|error| error.to_string())?,
        None => config.planner.default_tier,
    };
    let budget = args.budget.as_deref().map(parse_budget).transpose()?;

    Ok(PlanningOptions {
        max_stores: args.max_stores.unwrap_or(config.planner.default_max_stores),
        budget,
        tier,
    })
}

fn parse_budget(raw: &str) -> Result<Decimal, String> {
    let trimmed = raw.trim();
    let amount = trimmed.strip_prefix('$').unwrap_or(trimmed);
    Decimal::from_str(amount).map_err(|_| format!("budget `{raw}` is not a dollar amount"))
}

/// Human-readable shopping list: summary, per-store baskets, then every
/// ingredient the dish needs.
pub fn render_report(report: &ShoppingReport) -> String {
    let outcome = &report.outcome;
    let plan = &outcome.plan;
    let stores = plan.stores_used.iter().map(|store| store.as_str()).collect::<Vec<_>>();

    let mut lines = vec![
        format!("SHOPPING LIST FOR: {}", report.food_item.to_uppercase()),
        "=".repeat(RULE_WIDE),
        String::new(),
        format!("Stores to visit: {}", stores.join(", ")),
        format!("Total estimated cost: ${}", plan.total_cost),
        format!("Number of stores: {}", plan.store_count()),
        format!("Pricing tier: {}", report.tier),
        match outcome.strategy {
            PlanStrategy::Exhaustive => format!(
                "Search: exhaustive ({} combinations examined)",
                outcome.combinations_examined
            ),
            PlanStrategy::GreedyFallback { reason } => {
                format!("Search: greedy fallback ({})", reason.as_str())
            }
        },
        String::new(),
    ];

    for basket in &plan.shopping_list {
        lines.push(format!("{}:", basket.store.as_str().to_uppercase()));
        lines.push("-".repeat(RULE_NARROW));
        for item in &basket.items {
            let quantity = report
                .ingredient(&item.ingredient)
                .map(|ingredient| ingredient.quantity.as_str())
                .unwrap_or("1");
            let location = item
                .location
                .as_deref()
                .map(|location| format!(" @ {location}"))
                .unwrap_or_default();
            lines.push(format!("  - {} ({quantity}) - ${}{location}", item.ingredient, item.price));
        }
        lines.push(format!("  Store Total: ${}", basket.subtotal));
        lines.push(String::new());
    }

    if let Fulfillment::Partial { missing_ingredients } = &outcome.fulfillment {
        lines.push("NOT COVERED BY THE BUDGET:".to_string());
        lines.push("-".repeat(RULE_NARROW));
        for name in missing_ingredients {
            lines.push(format!("  - {name}"));
        }
        lines.push(String::new());
    }

    lines.push("COMPLETE INGREDIENTS LIST:".to_string());
    lines.push("-".repeat(RULE_NARROW));
    for ingredient in &report.ingredients_needed {
        lines.push(format!(
            "  - {} ({}) - {}",
            ingredient.name, ingredient.quantity, ingredient.category
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use cartplan_core::config::AppConfig;
    use cartplan_core::PricingTier;
    use rust_decimal::Decimal;

    use cartplan_core::{IngredientName, OptimizeError, PlanningError};
    use serde_json::Value;

    use super::{parse_budget, planning_failure, planning_options, PlanArgs};

    #[test]
    fn budget_accepts_dollar_prefix() {
        assert_eq!(parse_budget("$25.50"), Ok(Decimal::new(2_550, 2)));
        assert_eq!(parse_budget(" 40 "), Ok(Decimal::from(40)));
        assert!(parse_budget("forty").is_err());
    }

    #[test]
    fn infeasible_outcome_maps_to_infeasible_exit_code() {
        let error = PlanningError::from(OptimizeError::Infeasible {
            missing_ingredients: vec![IngredientName::from("Salmon")],
        });

        let result = planning_failure(&error);
        let payload: Value = serde_json::from_str(&result.output).expect("json payload");

        assert_eq!(result.exit_code, 3);
        assert_eq!(payload["error_class"], "infeasible");
        assert_eq!(payload["message"], "The budget does not cover: Salmon.");
    }

    #[test]
    fn arguments_override_configured_defaults() {
        let config = AppConfig::default();
        let args = PlanArgs {
            food_item: "pizza".to_string(),
            max_stores: Some(1),
            tier: Some("premium".to_string()),
            ..PlanArgs::default()
        };

        let options = planning_options(&config, &args).expect("valid arguments");

        assert_eq!(options.max_stores, 1);
        assert_eq!(options.tier, PricingTier::Premium);
        assert_eq!(options.budget, None);
    }

    #[test]
    fn configured_defaults_fill_missing_arguments() {
        let config = AppConfig::default();
        let args = PlanArgs { food_item: "pizza".to_string(), ..PlanArgs::default() };

        let options = planning_options(&config, &args).expect("valid arguments");

        assert_eq!(options.max_stores, 3);
        assert_eq!(options.tier, PricingTier::MidRange);
    }
}
