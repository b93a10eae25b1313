use std::env;
use std::sync::{Mutex, OnceLock};

use cartplan_cli::commands::plan::{self, PlanArgs};
use cartplan_cli::commands::{config, recipes};
use rust_decimal::Decimal;
use serde_json::Value;

fn plan_args(food_item: &str) -> PlanArgs {
    PlanArgs { food_item: food_item.to_string(), seed: Some(7), json: true, ..PlanArgs::default() }
}

#[test]
fn plan_returns_complete_report_for_known_recipe() {
    with_env(&[("CARTPLAN_OPTIMIZER_TIME_BUDGET_MS", "60000")], || {
        let result = plan::run(None, &plan_args("pizza"));
        assert_eq!(result.exit_code, 0, "expected successful plan");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "plan");
        assert_eq!(payload["status"], "ok");

        let report = &payload["report"];
        assert_eq!(report["food_item"], "pizza");
        assert_eq!(report["tier"], "mid_range");
        assert_eq!(report["outcome"]["fulfillment"]["status"], "complete");
        assert_eq!(report["outcome"]["strategy"]["kind"], "exhaustive");
        assert_eq!(array_len(&report["ingredients_needed"]), 6);
        assert_eq!(array_len(&report["all_store_options"]), 36);

        let stores_used = array_len(&report["outcome"]["plan"]["stores_used"]);
        assert!((1..=3).contains(&stores_used), "at most three stores by default");
    });
}

#[test]
fn seeded_plans_are_reproducible() {
    with_env(&[("CARTPLAN_OPTIMIZER_TIME_BUDGET_MS", "60000")], || {
        let first = plan::run(None, &plan_args("pasta"));
        let second = plan::run(None, &plan_args("pasta"));

        assert_eq!(first.exit_code, 0);
        assert_eq!(first.output, second.output);
    });
}

#[test]
fn tight_budget_returns_partial_plan_within_budget() {
    with_env(&[], || {
        let args = PlanArgs { budget: Some("$5".to_string()), ..plan_args("pizza") };
        let result = plan::run(None, &args);
        assert_eq!(result.exit_code, 0, "partial plans are still reported");

        let payload = parse_payload(&result.output);
        let outcome = &payload["report"]["outcome"];
        assert_eq!(outcome["fulfillment"]["status"], "partial");
        assert_eq!(outcome["strategy"]["kind"], "greedy_fallback");
        assert!(array_len(&outcome["fulfillment"]["missing_ingredients"]) > 0);
        assert!(decimal(&outcome["plan"]["total_cost"]) <= Decimal::from(5));
    });
}

#[test]
fn require_complete_turns_partial_plan_into_failure() {
    with_env(&[], || {
        let args = PlanArgs {
            budget: Some("5".to_string()),
            require_complete: true,
            ..plan_args("pizza")
        };
        let result = plan::run(None, &args);
        assert_eq!(result.exit_code, 3, "expected infeasible exit code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "infeasible");
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.starts_with("The budget does not cover: "), "got {message}");
    });
}

#[test]
fn invalid_requests_are_classified() {
    with_env(&[], || {
        let cases = [
            PlanArgs { max_stores: Some(0), ..plan_args("pizza") },
            PlanArgs { budget: Some("0".to_string()), ..plan_args("pizza") },
            PlanArgs { budget: Some("lots".to_string()), ..plan_args("pizza") },
            PlanArgs { tier: Some("luxury".to_string()), ..plan_args("pizza") },
        ];

        for args in cases {
            let result = plan::run(None, &args);
            assert_eq!(result.exit_code, 2, "expected invalid request exit code for {args:?}");

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "plan");
            assert_eq!(payload["error_class"], "invalid_request");
        }
    });
}

#[test]
fn plan_returns_config_failure_for_invalid_env() {
    with_env(&[("CARTPLAN_OPTIMIZER_TIME_BUDGET_MS", "0")], || {
        let result = plan::run(None, &plan_args("pizza"));
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn text_report_lists_baskets_and_ingredients() {
    with_env(&[], || {
        let args = PlanArgs { json: false, ..plan_args("Pasta") };
        let result = plan::run(None, &args);
        assert_eq!(result.exit_code, 0);

        assert!(result.output.starts_with("SHOPPING LIST FOR: PASTA"));
        assert!(result.output.contains("Store Total: $"));
        assert!(result.output.contains("COMPLETE INGREDIENTS LIST:"));
        assert!(result.output.contains("  - Spaghetti (1 lb) - Pantry"));
    });
}

#[test]
fn recipes_json_lists_bundled_table() {
    let result = recipes::run(true);
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "recipes");
    assert_eq!(array_len(&payload["recipes"]), 28);
    assert_eq!(payload["recipes"][0]["name"], "pizza");
}

#[test]
fn recipes_text_mentions_generic_fallback() {
    let result = recipes::run(false);

    assert!(result.output.starts_with("known recipes (28):"));
    assert!(result.output.contains("- chicken curry (8 ingredients)"));
    assert!(last_line(&result.output).contains("Main protein"));
}

#[test]
fn config_reports_env_source_attribution() {
    with_env(&[("CARTPLAN_PLANNER_DEFAULT_MAX_STORES", "4")], || {
        let result = config::run(None);
        assert_eq!(result.exit_code, 0);

        assert!(result.output.contains(
            "- planner.default_max_stores = 4 (source: env (CARTPLAN_PLANNER_DEFAULT_MAX_STORES))"
        ));
        assert!(result.output.contains("- planner.default_tier = mid_range (source: default)"));
        assert!(result.output.contains("- logging.format = compact (source: default)"));
    });
}

#[test]
fn blank_env_values_are_attributed_to_defaults() {
    with_env(&[("CARTPLAN_PLANNER_DEFAULT_MAX_STORES", "  ")], || {
        let result = config::run(None);
        assert_eq!(result.exit_code, 0);

        assert!(result.output.contains("- planner.default_max_stores = 3 (source: default)"));
    });
}

#[test]
fn config_returns_structured_failure_for_invalid_env() {
    with_env(&[("CARTPLAN_LOG_LEVEL", "chatty")], || {
        let result = config::run(None);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn array_len(value: &Value) -> usize {
    value.as_array().map(Vec::len).unwrap_or_default()
}

fn decimal(value: &Value) -> Decimal {
    value.as_str().and_then(|raw| raw.parse().ok()).expect("decimal encoded as string")
}

fn last_line(output: &str) -> &str {
    output.lines().last().unwrap_or_default()
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "CARTPLAN_OPTIMIZER_MAX_SEARCH_SPACE",
        "CARTPLAN_OPTIMIZER_MAX_COMBINATIONS",
        "CARTPLAN_OPTIMIZER_TIME_BUDGET_MS",
        "CARTPLAN_OPTIMIZER_PARALLEL",
        "CARTPLAN_OPTIMIZER_PARALLEL_MIN_SEARCH_SPACE",
        "CARTPLAN_PLANNER_DEFAULT_MAX_STORES",
        "CARTPLAN_PLANNER_DEFAULT_TIER",
        "CARTPLAN_PLANNER_PRICE_SEED",
        "CARTPLAN_LOGGING_LEVEL",
        "CARTPLAN_LOGGING_FORMAT",
        "CARTPLAN_LOG_LEVEL",
        "CARTPLAN_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, previous) in previous_values {
        match previous {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }
}
