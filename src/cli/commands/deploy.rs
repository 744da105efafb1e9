//! Deploy command - deploy the operator to hub and managed clusters

use crate::cli::args::DeployArgs;
use crate::config::Config;
use crate::environment::Environment;
use crate::error::DrctlResult;
use crate::orchestration::{DeployReport, DeploySettings, Deployer, Platform};
use crate::process::ProcessRunner;
use console::style;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Execute the deploy command
pub async fn execute(args: DeployArgs, config: &Config) -> DrctlResult<()> {
    let env = resolve_environment(&args).await?;
    let settings = settings(&args, config);
    let image = args
        .image
        .clone()
        .unwrap_or_else(|| config.deploy.image.clone());

    let platform = Platform::detect();
    debug!("Host platform: {}", platform.name());

    let deployer = Deployer::new(
        &platform,
        Arc::new(ProcessRunner::new()),
        settings,
        &config.deploy.guest_namespace,
    )?;
    debug!("Image loader: {}", deployer.loader_name());

    let report = deployer.run(&env, &image).await?;
    print_summary(&report);
    report.into_result()?;
    Ok(())
}

async fn resolve_environment(args: &DeployArgs) -> DrctlResult<Environment> {
    match &args.env_file {
        Some(path) => Environment::load(path, args.name_prefix.as_deref()).await,
        None => Ok(Environment::from_names(
            args.hub.clone(),
            args.cluster.clone(),
        )),
    }
}

fn settings(args: &DeployArgs, config: &Config) -> DeploySettings {
    let mut settings = DeploySettings::from_config(&config.deploy);

    if let Some(dir) = &args.source_dir {
        settings.source_dir = dir.clone();
    }
    if let Some(ns) = &args.namespace {
        settings.namespace = ns.clone();
    }
    if let Some(secs) = args.timeout {
        settings.rollout_timeout = Duration::from_secs(secs);
    }
    if args.skip_resources {
        settings.prepare_resources = false;
    }

    settings
}

fn print_summary(report: &DeployReport) {
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(()) => println!(
                "{} {} ({})",
                style("✓").green(),
                style(&outcome.target.name).cyan(),
                outcome.target.role
            ),
            Err(e) => println!(
                "{} {} ({}): {}",
                style("✗").red(),
                style(&outcome.target.name).cyan(),
                outcome.target.role,
                e
            ),
        }
    }
}
