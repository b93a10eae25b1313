pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use cartplan_core::config::{AppConfig, LoadOptions, LogFormat, LoggingConfig};
use clap::{Parser, Subcommand};

use crate::commands::plan::PlanArgs;

#[derive(Debug, Parser)]
#[command(
    name = "cartplan",
    about = "Grocery shopping-plan optimizer",
    long_about = "Plan where to buy a dish's ingredients: price every ingredient at every store, then pick the cheapest assignment that fits a store limit and budget.",
    after_help = "Examples:\n  cartplan plan pizza --max-stores 2 --budget 25\n  cartplan plan \"beef stew\" --tier budget --seed 7 --json\n  cartplan recipes\n  cartplan config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a cartplan.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Build an optimized shopping plan for a dish")]
    Plan(PlanArgs),
    #[command(about = "List the bundled recipes")]
    Recipes {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if let Ok(config) =
        AppConfig::load(LoadOptions { config_path: cli.config.clone(), ..LoadOptions::default() })
    {
        init_logging(&config.logging);
    }

    let result = match cli.command {
        Command::Plan(args) => commands::plan::run(cli.config, &args),
        Command::Recipes { json } => commands::recipes::run(json),
        Command::Config => commands::config::run(cli.config),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so stdout stays parseable.
fn init_logging(logging: &LoggingConfig) {
    use tracing::Level;

    let log_level = logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(log_level);

    let installed = match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(error) = installed {
        eprintln!("logging was not initialized: {error}");
    }
}
