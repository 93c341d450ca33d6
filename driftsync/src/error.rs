//! Error types for driftsync.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Main error type for driftsync operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Application configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Testbed inventory errors
    #[error("Inventory error: {0}")]
    Inventory(#[from] InventoryError),

    /// Desired-state loading and rendering errors
    #[error("Desired-state error: {0}")]
    Desired(#[from] DesiredError),

    /// External tool invocation errors (learning/diff tools)
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    /// Device command-executor errors
    #[error("Executor error: {0}")]
    Exec(#[from] ExecError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Application configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Config file is not valid YAML for the expected schema
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Testbed inventory errors.
#[derive(Error, Debug)]
pub enum InventoryError {
    /// Testbed descriptor could not be read
    #[error("Failed to read testbed file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Testbed descriptor is not valid YAML for the expected schema
    #[error("Failed to parse testbed file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Testbed descriptor defines no devices
    #[error("Testbed file {path} defines no devices")]
    Empty { path: PathBuf },
}

/// Desired-state errors (declaration files and template rendering).
///
/// All of these are fatal for the affected host; no defaults are
/// substituted for a missing or broken declaration.
#[derive(Error, Debug)]
pub enum DesiredError {
    /// No declaration file exists for the host
    #[error("No definition file for host '{host}' at {path}")]
    MissingDefinition { host: String, path: PathBuf },

    /// Declaration file could not be read
    #[error("Failed to read definition file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Declaration file is not valid YAML for the expected schema
    #[error("Failed to parse definition file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Declaration file has no `OSPF` key
    #[error("Definition file {path} has no OSPF declaration")]
    MissingDeclaration { path: PathBuf },

    /// A declared network is not a valid IPv4 CIDR
    #[error("Invalid network '{network}': {reason}")]
    InvalidNetwork { network: String, reason: String },

    /// Template file could not be read
    #[error("Failed to read template {path}: {source}")]
    TemplateRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Template rendering failed
    #[error("Template rendering failed: {0}")]
    Render(#[from] minijinja::Error),

    /// Declaration could not be encoded into the host attribute store
    #[error("Failed to bind declaration into host attributes: {0}")]
    Bind(#[from] serde_yaml::Error),
}

/// External tool invocation errors.
///
/// Exit status and stderr are always captured; a tool that exits
/// non-zero fails the run instead of being silently ignored.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Tool binary could not be launched
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Tool exited with a non-zero status
    #[error("'{program}' {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Device command-executor errors.
///
/// These are transport-level failures of the external executor tool.
/// Command rejections reported inside device output are carried on
/// [`CommandOutput`](crate::session::CommandOutput) instead.
#[derive(Error, Debug)]
pub enum ExecError {
    /// Executor binary could not be launched
    #[error("Failed to launch executor '{program}' for {host}: {source}")]
    Spawn {
        program: String,
        host: String,
        #[source]
        source: io::Error,
    },

    /// Executor exited with a non-zero status
    #[error("Executor failed on {host} running '{command}' ({status}): {stderr}")]
    Failed {
        host: String,
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    /// I/O failure while feeding commands to the executor
    #[error("Executor I/O failure on {host}: {source}")]
    Io {
        host: String,
        #[source]
        source: io::Error,
    },
}

/// Result type alias using driftsync's Error.
pub type Result<T> = std::result::Result<T, Error>;
