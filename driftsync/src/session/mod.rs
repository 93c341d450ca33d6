//! Device command execution seam.
//!
//! Transport to devices is owned by an out-of-process executor tool;
//! this module defines the traits the rest of the crate programs
//! against, the [`CommandOutput`] result object, and the adapters:
//! [`ExecSession`] drives the configured executor tool, [`MockSession`]
//! is the scripted test double.

mod exec;
mod mock;

pub use exec::{ExecConnector, ExecSession};
pub use mock::{MockConnector, MockSession};

use std::future::Future;
use std::time::Duration;

use crate::error::Result;
use crate::inventory::Host;

/// Markers that indicate command rejection in device CLI output.
///
/// A rejected command is reported on the [`CommandOutput`], it does not
/// abort the host's sequence; only transport-level executor failures do.
pub const FAILURE_MARKERS: &[&str] = &[
    "% Ambiguous command",
    "% Incomplete command",
    "% Invalid input",
    "% Unknown command",
];

/// Output of one executed command batch.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// The command lines that were sent, newline-joined.
    pub command: String,

    /// Captured device output.
    pub output: String,

    /// Time taken to execute the batch.
    pub elapsed: Duration,

    /// The offending output line when the device rejected a command.
    pub failure_message: Option<String>,
}

impl CommandOutput {
    /// Create a response, scanning the output for rejection markers.
    pub fn new(command: impl Into<String>, output: impl Into<String>, elapsed: Duration) -> Self {
        let output = output.into();
        let failure_message = FAILURE_MARKERS.iter().find_map(|marker| {
            output
                .lines()
                .find(|line| line.contains(marker))
                .map(|line| line.trim().to_string())
        });
        Self {
            command: command.into(),
            output,
            elapsed,
            failure_message,
        }
    }

    /// Check if the device accepted the batch.
    pub fn is_success(&self) -> bool {
        self.failure_message.is_none()
    }

    /// Get the output lines as an iterator.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.output.lines()
    }
}

impl std::fmt::Display for CommandOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.output)
    }
}

/// Creates sessions for hosts.
pub trait Connector: Send + Sync {
    type Session: Session;

    /// Open a session against the given host.
    fn connect(&self, host: &Host) -> impl Future<Output = Result<Self::Session>> + Send;
}

/// A live handle for executing commands on a single host.
pub trait Session: Send {
    /// Run a single operational command and capture its output.
    fn send_command(&mut self, command: &str) -> impl Future<Output = Result<CommandOutput>> + Send;

    /// Push configuration lines to the device, in order.
    fn send_config(
        &mut self,
        commands: &[String],
    ) -> impl Future<Output = Result<CommandOutput>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_output_is_success() {
        let out = CommandOutput::new("show version", "IOS XE 17.3", Duration::ZERO);
        assert!(out.is_success());
        assert!(out.failure_message.is_none());
    }

    #[test]
    fn rejection_marker_sets_failure_message() {
        let out = CommandOutput::new(
            "no router ospf one",
            "no router ospf one\n       ^\n% Invalid input detected at '^' marker.\n",
            Duration::ZERO,
        );
        assert!(!out.is_success());
        assert_eq!(
            out.failure_message.as_deref(),
            Some("% Invalid input detected at '^' marker.")
        );
    }

    #[test]
    fn ordinary_config_output_is_not_a_failure() {
        let out = CommandOutput::new(
            "show run | s ospf",
            "router ospf 1\n network 10.0.0.0 0.0.0.255 area 0\n",
            Duration::ZERO,
        );
        assert!(out.is_success());
    }
}
