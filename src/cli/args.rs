//! CLI argument definitions using clap derive

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// drctl - Deploy the DR operator to test clusters
///
/// Deploys the operator image to the hub and managed clusters of a test
/// environment, configures the hub for disaster recovery, and manages the
/// local cache of rendered bundles.
#[derive(Parser, Debug)]
#[command(name = "drctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "DRCTL_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Deploy the operator on the hub and managed clusters
    Deploy(DeployArgs),

    /// Configure the hub operator and DR resources of an environment
    Config(ConfigArgs),

    /// Write kubeconfigs and config.yaml for the e2e test suite
    DumpE2eConfig(DumpE2eConfigArgs),

    /// Manage the rendered bundle cache
    Cache(CacheArgs),

    /// Show or initialize drctl settings
    Settings(SettingsArgs),
}

/// Environment file selection shared by commands that need a full environment
#[derive(Args, Debug)]
pub struct EnvFileArgs {
    /// Environment file of the test environment
    #[arg(short, long)]
    pub env_file: PathBuf,

    /// Prefix added to cluster names from the environment file
    #[arg(long)]
    pub name_prefix: Option<String>,
}

/// Arguments for the deploy command
#[derive(Parser, Debug)]
pub struct DeployArgs {
    /// Environment file of the test environment
    #[arg(short, long, conflicts_with_all = ["hub", "cluster"])]
    pub env_file: Option<PathBuf>,

    /// Prefix added to cluster names from the environment file
    #[arg(long, requires = "env_file")]
    pub name_prefix: Option<String>,

    /// Hub cluster name
    #[arg(long)]
    pub hub: Option<String>,

    /// Managed cluster name (repeatable)
    #[arg(long)]
    pub cluster: Vec<String>,

    /// The container image to deploy (default: from config)
    #[arg(short, long)]
    pub image: Option<String>,

    /// Operator source directory (default: from config)
    #[arg(short, long)]
    pub source_dir: Option<PathBuf>,

    /// Operator namespace (default: from config)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Rollout timeout in seconds (default: from config)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Skip `make resources` in the source directory
    #[arg(long)]
    pub skip_resources: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub env: EnvFileArgs,

    /// Operator namespace (default: from settings)
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Timeout of each wait in seconds (default: from settings)
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Arguments for the dump-e2e-config command
#[derive(Parser, Debug)]
pub struct DumpE2eConfigArgs {
    #[command(flatten)]
    pub env: EnvFileArgs,

    /// Output directory (default: ~/.config/drenv/<environment name>)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for the settings command
#[derive(Parser, Debug)]
pub struct SettingsArgs {
    /// Subcommand for settings
    #[command(subcommand)]
    pub action: Option<SettingsAction>,
}

/// Settings subcommands
#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Show current settings
    Show,

    /// Show settings file path
    Path,

    /// Write default settings
    Init {
        /// Overwrite existing settings
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for list command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// Simple text (one key per line)
    Plain,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Print the path of a cached bundle, building it if missing or too old
    Get {
        /// Kustomization directory to build
        dir: PathBuf,
        /// Cache key
        key: String,
    },

    /// Rebuild a cached bundle if it is getting old
    Refresh {
        /// Kustomization directory to build
        dir: PathBuf,
        /// Cache key
        key: String,
    },

    /// Remove a cached bundle, or the whole cache
    Clear {
        /// Cache key (clears everything if omitted)
        key: Option<String>,
    },

    /// List cached bundles
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_deploy_with_clusters() {
        let cli = Cli::parse_from([
            "drctl", "deploy", "--hub", "hub", "--cluster", "dr1", "--cluster", "dr2",
            "--timeout", "300",
        ]);
        match cli.command {
            Commands::Deploy(args) => {
                assert_eq!(args.hub.as_deref(), Some("hub"));
                assert_eq!(args.cluster, vec!["dr1", "dr2"]);
                assert_eq!(args.timeout, Some(300));
                assert!(!args.skip_resources);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn env_file_conflicts_with_names() {
        let result = Cli::try_parse_from([
            "drctl", "deploy", "--env-file", "env.yaml", "--cluster", "dr1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_config_with_env_file() {
        let cli = Cli::parse_from([
            "drctl", "config", "--env-file", "regional-dr.yaml", "--name-prefix", "rdr-",
            "--timeout", "300",
        ]);
        match cli.command {
            Commands::Config(args) => {
                assert_eq!(args.env.env_file, PathBuf::from("regional-dr.yaml"));
                assert_eq!(args.env.name_prefix.as_deref(), Some("rdr-"));
                assert_eq!(args.timeout, Some(300));
                assert!(args.namespace.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_requires_env_file() {
        assert!(Cli::try_parse_from(["drctl", "config"]).is_err());
        assert!(Cli::try_parse_from(["drctl", "dump-e2e-config"]).is_err());
    }

    #[test]
    fn parse_dump_e2e_config() {
        let cli = Cli::parse_from([
            "drctl", "dump-e2e-config", "-e", "env.yaml", "-o", "e2e/config",
        ]);
        match cli.command {
            Commands::DumpE2eConfig(args) => {
                assert_eq!(args.env.env_file, PathBuf::from("env.yaml"));
                assert_eq!(args.output_dir, Some(PathBuf::from("e2e/config")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parse_settings_defaults_to_show() {
        let cli = Cli::parse_from(["drctl", "settings"]);
        assert!(matches!(
            cli.command,
            Commands::Settings(SettingsArgs { action: None })
        ));
    }

    #[test]
    fn parse_cache_clear_without_key() {
        let cli = Cli::parse_from(["drctl", "cache", "clear"]);
        match cli.command {
            Commands::Cache(CacheArgs {
                action: CacheAction::Clear { key },
            }) => assert!(key.is_none()),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
