//! Application configuration.
//!
//! A single YAML file configures the whole run. Every key is optional;
//! defaults reproduce the conventional file layout (`testbed.yaml`,
//! `host_vars/`, `templates/ospf.j2`, `desired-ospf/`, `ospf-current`,
//! `ospfdiff`).

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Inventory sources.
    pub inventory: InventoryConfig,

    /// Template rendered into the desired command sequence.
    pub template: TemplatePath,

    /// Desired-state input and scratch output directories.
    pub paths: ScratchPaths,

    /// Per-host fan-out settings.
    pub runner: RunnerConfig,

    /// Out-of-process command executor for device access.
    ///
    /// Invoked as `<program> <args...> <address[:port]>` with the command
    /// lines written to stdin.
    pub executor: ToolSpec,

    /// External learning and diff tools.
    pub tools: ToolsConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    /// Load configuration, falling back to the built-in defaults when the
    /// file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            warn!(
                "config file {} not found, using built-in defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }
}

/// Inventory file locations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Testbed descriptor listing the managed devices.
    pub testbed_file: PathBuf,

    /// Directory of per-host declaration files, one `<host>.yaml` each.
    pub host_vars_dir: PathBuf,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            testbed_file: PathBuf::from("testbed.yaml"),
            host_vars_dir: PathBuf::from("host_vars"),
        }
    }
}

/// Path of the desired-state template.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct TemplatePath(pub PathBuf);

impl Default for TemplatePath {
    fn default() -> Self {
        Self(PathBuf::from("templates/ospf.j2"))
    }
}

impl AsRef<Path> for TemplatePath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Desired-state input directory and per-run scratch directories.
///
/// The snapshot and diff directories are removed after every run; the
/// desired directory is an input and is left alone.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScratchPaths {
    pub desired_dir: PathBuf,
    pub snapshot_dir: PathBuf,
    pub diff_dir: PathBuf,
}

impl Default for ScratchPaths {
    fn default() -> Self {
        Self {
            desired_dir: PathBuf::from("desired-ospf"),
            snapshot_dir: PathBuf::from("ospf-current"),
            diff_dir: PathBuf::from("ospfdiff"),
        }
    }
}

/// Per-host fan-out settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Maximum number of hosts worked on concurrently.
    pub num_workers: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self { num_workers: 20 }
    }
}

/// An external program plus its fixed leading arguments.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ToolSpec {
    fn default() -> Self {
        Self {
            program: String::from("ssh"),
            args: vec![String::from("-T")],
        }
    }
}

/// External learning and diff tool commands.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Snapshot capture. Invoked with
    /// `--testbed-file <testbed> --output <snapshot_dir>` appended.
    pub learn: ToolSpec,

    /// Desired-vs-live comparison. Invoked with
    /// `<desired_dir> <snapshot_dir> --output <diff_dir>` appended.
    pub diff: ToolSpec,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            learn: ToolSpec {
                program: String::from("pyats"),
                args: vec![String::from("learn"), String::from("ospf")],
            },
            diff: ToolSpec {
                program: String::from("pyats"),
                args: vec![String::from("diff")],
            },
        }
    }
}
