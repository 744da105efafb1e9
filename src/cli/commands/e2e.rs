//! Dump-e2e-config command - write the e2e suite configuration

use crate::cli::args::DumpE2eConfigArgs;
use crate::environment::Environment;
use crate::error::{DrctlError, DrctlResult};
use crate::orchestration::e2e::default_output_dir;
use crate::orchestration::{dump_e2e_config, Kubectl};
use crate::process::ProcessRunner;
use console::style;
use std::sync::Arc;

/// Execute the dump-e2e-config command
pub async fn execute(args: DumpE2eConfigArgs) -> DrctlResult<()> {
    let env = Environment::load(&args.env.env_file, args.env.name_prefix.as_deref()).await?;

    let base = match (args.output_dir, &env.name) {
        (Some(dir), _) => dir,
        (None, Some(name)) => default_output_dir(name),
        (None, None) => return Err(DrctlError::EnvIncomplete("name")),
    };

    let kubectl = Kubectl::new(Arc::new(ProcessRunner::new()));
    let path = dump_e2e_config(&env, &kubectl, &base).await?;

    println!("{} Wrote {}", style("✓").green(), style(path.display()).dim());
    Ok(())
}
