use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::pricing::PricingTier;
use crate::optimizer::search::SearchLimits;

pub const DEFAULT_CONFIG_FILE: &str = "cartplan.toml";
pub const NESTED_CONFIG_FILE: &str = "config/cartplan.toml";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub optimizer: OptimizerConfig,
    pub planner: PlannerConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptimizerConfig {
    pub max_search_space: u64,
    pub max_combinations: u64,
    pub time_budget_ms: u64,
    pub parallel: bool,
    pub parallel_min_search_space: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlannerConfig {
    pub default_max_stores: usize,
    pub default_tier: PricingTier,
    pub price_seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub default_max_stores: Option<usize>,
    pub default_tier: Option<PricingTier>,
    pub price_seed: Option<u64>,
    pub parallel: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        let limits = SearchLimits::default();
        Self {
            optimizer: OptimizerConfig {
                max_search_space: limits.max_search_space,
                max_combinations: limits.max_combinations,
                time_budget_ms: limits
                    .time_budget
                    .map_or(1_500, |budget| budget.as_millis() as u64),
                parallel: limits.parallel,
                parallel_min_search_space: limits.parallel_min_search_space,
            },
            planner: PlannerConfig {
                default_max_stores: 3,
                default_tier: PricingTier::MidRange,
                price_seed: None,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl OptimizerConfig {
    pub fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            max_search_space: self.max_search_space,
            max_combinations: self.max_combinations,
            time_budget: Some(Duration::from_millis(self.time_budget_ms)),
            parallel: self.parallel,
            parallel_min_search_space: self.parallel_min_search_space,
        }
    }
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(optimizer) = patch.optimizer {
            if let Some(max_search_space) = optimizer.max_search_space {
                self.optimizer.max_search_space = max_search_space;
            }
            if let Some(max_combinations) = optimizer.max_combinations {
                self.optimizer.max_combinations = max_combinations;
            }
            if let Some(time_budget_ms) = optimizer.time_budget_ms {
                self.optimizer.time_budget_ms = time_budget_ms;
            }
            if let Some(parallel) = optimizer.parallel {
                self.optimizer.parallel = parallel;
            }
            if let Some(parallel_min_search_space) = optimizer.parallel_min_search_space {
                self.optimizer.parallel_min_search_space = parallel_min_search_space;
            }
        }

        if let Some(planner) = patch.planner {
            if let Some(default_max_stores) = planner.default_max_stores {
                self.planner.default_max_stores = default_max_stores;
            }
            if let Some(default_tier) = planner.default_tier {
                self.planner.default_tier = default_tier;
            }
            if let Some(price_seed) = planner.price_seed {
                self.planner.price_seed = Some(price_seed);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("CARTPLAN_OPTIMIZER_MAX_SEARCH_SPACE") {
            self.optimizer.max_search_space =
                parse_u64("CARTPLAN_OPTIMIZER_MAX_SEARCH_SPACE", &value)?;
        }
        if let Some(value) = read_env("CARTPLAN_OPTIMIZER_MAX_COMBINATIONS") {
            self.optimizer.max_combinations =
                parse_u64("CARTPLAN_OPTIMIZER_MAX_COMBINATIONS", &value)?;
        }
        if let Some(value) = read_env("CARTPLAN_OPTIMIZER_TIME_BUDGET_MS") {
            self.optimizer.time_budget_ms = parse_u64("CARTPLAN_OPTIMIZER_TIME_BUDGET_MS", &value)?;
        }
        if let Some(value) = read_env("CARTPLAN_OPTIMIZER_PARALLEL") {
            self.optimizer.parallel = parse_bool("CARTPLAN_OPTIMIZER_PARALLEL", &value)?;
        }
        if let Some(value) = read_env("CARTPLAN_OPTIMIZER_PARALLEL_MIN_SEARCH_SPACE") {
            self.optimizer.parallel_min_search_space =
                parse_u64("CARTPLAN_OPTIMIZER_PARALLEL_MIN_SEARCH_SPACE", &value)?;
        }

        if let Some(value) = read_env("CARTPLAN_PLANNER_DEFAULT_MAX_STORES") {
            self.planner.default_max_stores =
                parse_usize("CARTPLAN_PLANNER_DEFAULT_MAX_STORES", &value)?;
        }
        if let Some(value) = read_env("CARTPLAN_PLANNER_DEFAULT_TIER") {
            self.planner.default_tier =
                value.parse().map_err(|_| ConfigError::InvalidEnvOverride {
                    key: "CARTPLAN_PLANNER_DEFAULT_TIER".to_string(),
                    value: value.clone(),
                })?;
        }
        if let Some(value) = read_env("CARTPLAN_PLANNER_PRICE_SEED") {
            self.planner.price_seed = Some(parse_u64("CARTPLAN_PLANNER_PRICE_SEED", &value)?);
        }

        let log_level =
            read_env("CARTPLAN_LOGGING_LEVEL").or_else(|| read_env("CARTPLAN_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("CARTPLAN_LOGGING_FORMAT").or_else(|| read_env("CARTPLAN_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(default_max_stores) = overrides.default_max_stores {
            self.planner.default_max_stores = default_max_stores;
        }
        if let Some(default_tier) = overrides.default_tier {
            self.planner.default_tier = default_tier;
        }
        if let Some(price_seed) = overrides.price_seed {
            self.planner.price_seed = Some(price_seed);
        }
        if let Some(parallel) = overrides.parallel {
            self.optimizer.parallel = parallel;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_optimizer(&self.optimizer)?;
        validate_planner(&self.planner)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// First existing candidate among the explicit path, `cartplan.toml` and
/// `config/cartplan.toml`.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from(NESTED_CONFIG_FILE)]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_optimizer(optimizer: &OptimizerConfig) -> Result<(), ConfigError> {
    if optimizer.max_search_space == 0 {
        return Err(ConfigError::Validation(
            "optimizer.max_search_space must be greater than zero".to_string(),
        ));
    }

    if optimizer.max_combinations == 0 {
        return Err(ConfigError::Validation(
            "optimizer.max_combinations must be greater than zero".to_string(),
        ));
    }

    if optimizer.time_budget_ms == 0 || optimizer.time_budget_ms > 60_000 {
        return Err(ConfigError::Validation(
            "optimizer.time_budget_ms must be in range 1..=60000".to_string(),
        ));
    }

    Ok(())
}

fn validate_planner(planner: &PlannerConfig) -> Result<(), ConfigError> {
    if planner.default_max_stores == 0 {
        return Err(ConfigError::Validation(
            "planner.default_max_stores must be at least 1".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.parse::<bool>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    optimizer: Option<OptimizerPatch>,
    planner: Option<PlannerPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct OptimizerPatch {
    max_search_space: Option<u64>,
    max_combinations: Option<u64>,
    time_budget_ms: Option<u64>,
    parallel: Option<bool>,
    parallel_min_search_space: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PlannerPatch {
    default_max_stores: Option<usize>,
    default_tier: Option<PricingTier>,
    price_seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
