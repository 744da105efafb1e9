//! Settings command - show or initialize drctl settings

use crate::cli::args::{SettingsAction, SettingsArgs};
use crate::config::{Config, ConfigManager};
use crate::error::DrctlResult;
use console::style;

/// Execute the settings command
pub async fn execute(
    args: SettingsArgs,
    config: &Config,
    manager: &ConfigManager,
) -> DrctlResult<()> {
    match args.action {
        None | Some(SettingsAction::Show) => println!("{}", toml::to_string_pretty(config)?),
        Some(SettingsAction::Path) => println!("{}", manager.path().display()),
        Some(SettingsAction::Init { force }) => {
            if manager.init(force).await? {
                println!(
                    "{} Settings written to {}",
                    style("✓").green(),
                    style(manager.path().display()).dim()
                );
            } else {
                println!(
                    "{} Settings already exist at {}",
                    style("!").yellow(),
                    manager.path().display()
                );
                println!("  {}", style("Use --force to overwrite").dim());
            }
        }
    }

    Ok(())
}
