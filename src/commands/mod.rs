//! CLI command definitions and dispatch.

pub mod config;
pub mod names;
pub mod run;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use crate::output::OutputFormat;
use dungeon_core::config::{AppConfig, LoggingConfig};
use dungeon_core::error::AppError;

/// Dungeon Queue: bounded dungeon instance pool simulator
#[derive(Debug, Parser)]
#[command(name = "dungeon-queue", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Form parties from the roster and run them through the instance pool
    Run(run::RunArgs),
    /// Print generated instance names
    Names(names::NamesArgs),
    /// Show the resolved configuration
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let mut config = AppConfig::load(&self.config)?;
        if let Commands::Run(args) = &self.command {
            args.apply(&mut config);
        }
        config.validate()?;

        init_logging(&config.logging);
        tracing::debug!(config_path = %self.config, "Configuration resolved");

        match &self.command {
            Commands::Run(args) => run::execute(args, &config, self.format).await,
            Commands::Names(args) => names::execute(args, self.format),
            Commands::Config => config::execute(&config, self.format),
        }
    }
}

/// Initialize tracing/logging
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
