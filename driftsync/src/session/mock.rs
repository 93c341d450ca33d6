//! Scripted test double for the session layer.
//!
//! Records every executed line and returns preset command output, so
//! orchestration logic can be exercised without any device or executor
//! tool behind it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use indexmap::IndexMap;

use super::{CommandOutput, Connector, Session};
use crate::error::Result;
use crate::inventory::Host;

#[derive(Debug, Default)]
struct MockState {
    /// Canned output per host for operational commands.
    command_output: IndexMap<String, String>,
    /// Operational commands sent, as (host, command) in execution order.
    queries: Vec<(String, String)>,
    /// Configuration lines sent, as (host, line) in execution order.
    config_lines: Vec<(String, String)>,
    /// Hosts whose config pushes fail at the transport level.
    failing_config: Vec<String>,
}

/// Test-double connector with scripted command output.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    state: Arc<Mutex<MockState>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output returned for operational commands on `host`.
    pub fn set_command_output(&self, host: &str, output: &str) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state
            .command_output
            .insert(host.to_string(), output.to_string());
    }

    /// Operational commands sent so far, as (host, command) pairs.
    pub fn queries(&self) -> Vec<(String, String)> {
        self.state.lock().expect("mock state poisoned").queries.clone()
    }

    /// Configuration lines sent so far, as (host, line) pairs.
    pub fn config_lines(&self) -> Vec<(String, String)> {
        self.state
            .lock()
            .expect("mock state poisoned")
            .config_lines
            .clone()
    }

    /// Make every config push to `host` fail like a broken transport.
    pub fn fail_config(&self, host: &str) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.failing_config.push(host.to_string());
    }

    /// Configuration lines sent to one host, in order.
    pub fn config_lines_for(&self, host: &str) -> Vec<String> {
        self.config_lines()
            .into_iter()
            .filter(|(h, _)| h == host)
            .map(|(_, line)| line)
            .collect()
    }
}

impl Connector for MockConnector {
    type Session = MockSession;

    async fn connect(&self, host: &Host) -> Result<MockSession> {
        Ok(MockSession {
            host: host.name.clone(),
            connector: self.clone(),
        })
    }
}

/// Session half of [`MockConnector`].
#[derive(Debug)]
pub struct MockSession {
    host: String,
    connector: MockConnector,
}

impl Session for MockSession {
    async fn send_command(&mut self, command: &str) -> Result<CommandOutput> {
        let mut state = self.connector.state.lock().expect("mock state poisoned");
        state.queries.push((self.host.clone(), command.to_string()));
        let output = state
            .command_output
            .get(&self.host)
            .cloned()
            .unwrap_or_default();
        Ok(CommandOutput::new(command, output, Duration::ZERO))
    }

    async fn send_config(&mut self, commands: &[String]) -> Result<CommandOutput> {
        let mut state = self.connector.state.lock().expect("mock state poisoned");
        if state.failing_config.iter().any(|h| h == &self.host) {
            return Err(crate::error::ExecError::Io {
                host: self.host.clone(),
                source: std::io::Error::other("scripted transport failure"),
            }
            .into());
        }
        for line in commands {
            state.config_lines.push((self.host.clone(), line.clone()));
        }
        Ok(CommandOutput::new(commands.join("\n"), "", Duration::ZERO))
    }
}
