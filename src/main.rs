//! drctl - DR operator test-environment tooling
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use drctl::cli::{Cli, Commands};
use drctl::config::ConfigManager;
use drctl::error::DrctlResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> DrctlResult<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(cli.config.clone());
    let config = config_manager.load().await?;

    // Initialize logging: 0 = info (deploy progress), 1+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("drctl=info"),
        _ => EnvFilter::new("drctl=debug"),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if config.general.log_format == "json" {
        subscriber.json().init();
    } else {
        subscriber.without_time().init();
    }

    match cli.command {
        Commands::Deploy(args) => drctl::cli::commands::deploy(args, &config).await,
        Commands::Config(args) => drctl::cli::commands::configure(args, &config).await,
        Commands::DumpE2eConfig(args) => drctl::cli::commands::dump_e2e_config(args).await,
        Commands::Cache(args) => drctl::cli::commands::cache(args, &config).await,
        Commands::Settings(args) => {
            drctl::cli::commands::settings(args, &config, &config_manager).await
        }
    }
}
