//! Subprocess adapter for the external command-executor tool.
//!
//! The executor tool owns transport, authentication, and prompt
//! handling. Each batch is one invocation:
//!
//! ```text
//! <program> <args...> <address[:port]>
//! ```
//!
//! with the command lines written to stdin and device output captured
//! from stdout. A non-zero exit is a transport failure and aborts the
//! host's remaining sequence.

use std::process::Stdio;
use std::time::Instant;

use log::debug;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::{CommandOutput, Connector, Session};
use crate::config::ToolSpec;
use crate::error::{ExecError, Result};
use crate::inventory::Host;

/// Connector that launches the configured executor tool per batch.
#[derive(Debug, Clone)]
pub struct ExecConnector {
    spec: ToolSpec,
}

impl ExecConnector {
    pub fn new(spec: ToolSpec) -> Self {
        Self { spec }
    }
}

impl Connector for ExecConnector {
    type Session = ExecSession;

    async fn connect(&self, host: &Host) -> Result<ExecSession> {
        Ok(ExecSession {
            spec: self.spec.clone(),
            host: host.name.clone(),
            target: host.target(),
        })
    }
}

/// Session handle for one host, backed by the executor tool.
#[derive(Debug)]
pub struct ExecSession {
    spec: ToolSpec,
    host: String,
    target: String,
}

impl ExecSession {
    async fn run_batch(&self, label: &str, input: String) -> Result<CommandOutput> {
        let started = Instant::now();
        let mut child = Command::new(&self.spec.program)
            .args(&self.spec.args)
            .arg(&self.target)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: self.spec.program.clone(),
                host: self.host.clone(),
                source,
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .await
                .map_err(|source| ExecError::Io {
                    host: self.host.clone(),
                    source,
                })?;
            // dropping stdin closes the pipe so the tool sees EOF
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|source| ExecError::Io {
                host: self.host.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ExecError::Failed {
                host: self.host.clone(),
                command: label.to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        Ok(CommandOutput::new(label, stdout, started.elapsed()))
    }
}

impl Session for ExecSession {
    async fn send_command(&mut self, command: &str) -> Result<CommandOutput> {
        debug!("{}: sending '{}'", self.host, command);
        let mut input = command.to_string();
        input.push('\n');
        self.run_batch(command, input).await
    }

    async fn send_config(&mut self, commands: &[String]) -> Result<CommandOutput> {
        debug!("{}: pushing {} config line(s)", self.host, commands.len());
        let label = commands.join("\n");
        let mut input = label.clone();
        input.push('\n');
        self.run_batch(&label, input).await
    }
}
