mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use matrix_service::FanOutConfig;

/// Expand and validate matrixed pipeline tasks
#[derive(Debug, Parser)]
#[command(name = "matrix", version, about, long_about = None)]
struct Cli {
    /// Fan-out config file (YAML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum combinations per task; overrides the config file
    #[arg(long, global = true, value_name = "N")]
    max_combinations: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn fan_out_config(&self) -> Result<FanOutConfig> {
        let mut config = match &self.config {
            Some(path) => FanOutConfig::from_file(path)?,
            None => FanOutConfig::default(),
        };
        if let Some(max) = self.max_combinations {
            config.max_combinations = max;
        }
        Ok(config)
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate the matrices of a pipeline YAML file
    Validate(commands::validate::ValidateArgs),
    /// Print the runs generated for every task of a pipeline
    Expand(commands::expand::ExpandArgs),
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.fan_out_config()?;

    match cli.command {
        Commands::Validate(args) => commands::validate::execute(args, &config),
        Commands::Expand(args) => commands::expand::execute(args, &config),
    }
}
