//! Config command - configure the hub for disaster recovery

use crate::cli::args::ConfigArgs;
use crate::config::Config;
use crate::environment::Environment;
use crate::error::DrctlResult;
use crate::orchestration::HubConfigurator;
use crate::process::ProcessRunner;
use console::style;
use std::sync::Arc;
use std::time::Duration;

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config) -> DrctlResult<()> {
    let env = Environment::load(&args.env.env_file, args.env.name_prefix.as_deref()).await?;

    let mut configurator = HubConfigurator::from_config(config, Arc::new(ProcessRunner::new()));
    if let Some(ns) = args.namespace {
        configurator = configurator.with_namespace(ns);
    }
    if let Some(secs) = args.timeout {
        configurator = configurator.with_timeout(Duration::from_secs(secs));
    }

    configurator.run(&env).await?;

    println!(
        "{} Hub configured for {}",
        style("✓").green(),
        style(env.topology).cyan()
    );
    Ok(())
}
