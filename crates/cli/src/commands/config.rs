use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use cartplan_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

use crate::commands::{CommandResult, EXIT_CONFIG};

pub fn run(config_path: Option<PathBuf>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions {
        config_path: config_path.clone(),
        ..LoadOptions::default()
    }) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "config",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            )
        }
    };

    let file_path = resolve_config_path(config_path.as_deref());
    let file_doc = load_config_file_doc(file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, file_doc.as_ref(), file_path.as_deref())
    };

    let optimizer = &config.optimizer;
    let planner = &config.planner;
    let lines = vec![
        "effective config (source precedence: env > file > default):".to_string(),
        render_line(
            "optimizer.max_search_space",
            &optimizer.max_search_space.to_string(),
            source("optimizer.max_search_space", &["CARTPLAN_OPTIMIZER_MAX_SEARCH_SPACE"]),
        ),
        render_line(
            "optimizer.max_combinations",
            &optimizer.max_combinations.to_string(),
            source("optimizer.max_combinations", &["CARTPLAN_OPTIMIZER_MAX_COMBINATIONS"]),
        ),
        render_line(
            "optimizer.time_budget_ms",
            &optimizer.time_budget_ms.to_string(),
            source("optimizer.time_budget_ms", &["CARTPLAN_OPTIMIZER_TIME_BUDGET_MS"]),
        ),
        render_line(
            "optimizer.parallel",
            &optimizer.parallel.to_string(),
            source("optimizer.parallel", &["CARTPLAN_OPTIMIZER_PARALLEL"]),
        ),
        render_line(
            "optimizer.parallel_min_search_space",
            &optimizer.parallel_min_search_space.to_string(),
            source(
                "optimizer.parallel_min_search_space",
                &["CARTPLAN_OPTIMIZER_PARALLEL_MIN_SEARCH_SPACE"],
            ),
        ),
        render_line(
            "planner.default_max_stores",
            &planner.default_max_stores.to_string(),
            source("planner.default_max_stores", &["CARTPLAN_PLANNER_DEFAULT_MAX_STORES"]),
        ),
        render_line(
            "planner.default_tier",
            planner.default_tier.as_str(),
            source("planner.default_tier", &["CARTPLAN_PLANNER_DEFAULT_TIER"]),
        ),
        render_line(
            "planner.price_seed",
            &planner.price_seed.map_or_else(|| "<unset>".to_string(), |seed| seed.to_string()),
            source("planner.price_seed", &["CARTPLAN_PLANNER_PRICE_SEED"]),
        ),
        render_line(
            "logging.level",
            &config.logging.level,
            source("logging.level", &["CARTPLAN_LOGGING_LEVEL", "CARTPLAN_LOG_LEVEL"]),
        ),
        render_line(
            "logging.format",
            config.logging.format.as_str(),
            source("logging.format", &["CARTPLAN_LOGGING_FORMAT", "CARTPLAN_LOG_FORMAT"]),
        ),
    ];

    CommandResult::text(lines.join("\n"))
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    let env_key = env_keys
        .iter()
        .find(|key| env::var(key).is_ok_and(|value| !value.trim().is_empty()));
    if let Some(env_key) = env_key {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::contains_path;

    #[test]
    fn nested_keys_are_found_in_file_documents() {
        let doc = "[planner]\ndefault_max_stores = 2\n".parse::<Value>().expect("valid toml");

        assert!(contains_path(&doc, "planner.default_max_stores"));
        assert!(!contains_path(&doc, "planner.price_seed"));
        assert!(!contains_path(&doc, "optimizer.parallel"));
    }
}
