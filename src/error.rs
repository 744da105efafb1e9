//! Error types for drctl
//!
//! All modules use `DrctlResult<T>` as their return type.

use std::fmt::Write as _;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for drctl operations
pub type DrctlResult<T> = Result<T, DrctlError>;

/// All errors that can occur in drctl
#[derive(Error, Debug)]
pub enum DrctlError {
    // Environment errors
    #[error("Don't know how to load images on {0}. drctl supports macOS and Linux.")]
    UnsupportedPlatform(String),

    #[error("Invalid environment file {path}: {reason}")]
    EnvInvalid { path: PathBuf, reason: String },

    #[error("No clusters to deploy to")]
    NoTargets,

    #[error("Environment has no {0}")]
    EnvIncomplete(&'static str),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    // Process errors
    #[error("Could not execute {command}: {source}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed: {command}, exit code: {code}, stderr: {stderr}")]
    Command {
        command: String,
        code: i32,
        stderr: String,
        stdout: String,
    },

    #[error("Command terminated by signal: {command}")]
    ProcessSignaled { command: String },

    // Cluster state errors
    #[error("No {what} found in cluster {cluster}")]
    ResourceMissing { what: String, cluster: String },

    #[error("Timed out after {timeout_secs}s waiting for {resource}: {last_error}")]
    WaitTimeout {
        resource: String,
        timeout_secs: u64,
        last_error: String,
    },

    #[error("Cannot render {name}: {reason}")]
    Template { name: &'static str, reason: String },

    // Deploy errors
    #[error("Deploy failed in {} cluster(s):{}", .failures.len(), format_failures(.failures))]
    DeployFailed { failures: Vec<TargetFailure> },

    // Cache errors
    #[error("Invalid cache key: {0:?}")]
    InvalidCacheKey(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("YAML serialize error: {0}")]
    YamlSerialize(#[from] serde_yaml::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A deploy failure in a single cluster
#[derive(Debug)]
pub struct TargetFailure {
    /// Cluster name
    pub cluster: String,
    /// What went wrong in this cluster
    pub error: DrctlError,
}

fn format_failures(failures: &[TargetFailure]) -> String {
    let mut out = String::new();
    for failure in failures {
        let _ = write!(out, "\n  {}: {}", failure.cluster, failure.error);
    }
    out
}

impl DrctlError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Exit code of the failed command, if the command ran at all
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Command { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::UnsupportedPlatform(_) => {
                Some("Images are loaded with minikube on Linux and limactl on macOS")
            }
            Self::CommandFailed { source, .. }
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Some("Install the missing tool and make sure it is in PATH")
            }
            Self::NoTargets => Some("Use --env-file, or --hub and --cluster"),
            Self::EnvIncomplete("name") => {
                Some("Pass --output-dir, or add a name to the environment file")
            }
            Self::EnvIncomplete(_) => Some(
                "The ramen section of the environment file needs a hub and two clusters",
            ),
            Self::WaitTimeout { .. } => Some("Check the operator logs on the hub cluster"),
            _ => None,
        }
    }
}
