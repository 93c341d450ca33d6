//! The drift-reconciliation state machine.
//!
//! One run moves through two phases and ends in one of three terminal
//! outcomes:
//!
//! ```text
//! Learning -> Comparing -> in sync            => Converged
//!                       -> drift, declined    => DriftAcknowledged
//!                       -> drift, confirmed   => Remediated
//! ```
//!
//! The inventory and connector are built once per run and used by every
//! phase. Scratch artifacts (snapshot and diff directories) are removed
//! before the run terminates, whatever the outcome.

use std::io::{self, BufRead, Write};

use log::{info, warn};

use crate::config::AppConfig;
use crate::error::Result;
use crate::inventory::Inventory;
use crate::report::{self, HostReport};
use crate::runner::{self, HostAction};
use crate::session::Connector;
use crate::tools::{DiffReport, Differ, Snapshotter};

/// Terminal outcome of one reconciliation run.
#[derive(Debug)]
pub enum Outcome {
    /// Live state already matched the desired state.
    Converged,

    /// Drift was detected and the operator declined remediation.
    DriftAcknowledged,

    /// Drift was detected and the desired state was reapplied.
    Remediated(Vec<HostReport>),
}

/// Token that confirms remediation. Exact and case-sensitive; every
/// other input declines.
pub const AFFIRMATIVE: &str = "y";

pub(crate) fn token_confirms(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']) == AFFIRMATIVE
}

/// Operator confirmation seam.
pub trait Confirm {
    /// Present `message` and return whether the operator confirmed.
    fn confirm(&mut self, message: &str) -> io::Result<bool>;
}

/// Blocking stdin prompt.
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, message: &str) -> io::Result<bool> {
        print!("{message} <y/n>: ");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(token_confirms(&line))
    }
}

/// Auto-confirming prompt for non-interactive runs.
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _message: &str) -> io::Result<bool> {
        Ok(true)
    }
}

/// Drives the reconciliation workflow against one inventory.
pub struct Reconciler<C> {
    config: AppConfig,
    inventory: Inventory,
    connector: C,
}

impl<C> Reconciler<C>
where
    C: Connector + Clone + 'static,
{
    pub fn new(config: AppConfig, inventory: Inventory, connector: C) -> Self {
        Self {
            config,
            inventory,
            connector,
        }
    }

    /// Run one full reconciliation cycle.
    pub async fn run(&self, confirm: &mut impl Confirm) -> Result<Outcome> {
        // Learning
        let snapshotter = Snapshotter::new(
            self.config.tools.learn.clone(),
            self.config.inventory.testbed_file.clone(),
            self.config.paths.snapshot_dir.clone(),
        );
        snapshotter.capture().await?;

        // Comparing
        let differ = Differ::new(
            self.config.tools.diff.clone(),
            self.config.paths.desired_dir.clone(),
            self.config.paths.snapshot_dir.clone(),
            self.config.paths.diff_dir.clone(),
        );
        let diff = differ.compare().await?;

        match diff {
            DiffReport::InSync => {
                self.clean_artifacts().await;
                report::announce_in_sync();
                Ok(Outcome::Converged)
            }
            DiffReport::Drift { location } => {
                report::alert_drift(location.as_deref());
                let confirmed = confirm
                    .confirm("Reapply the desired OSPF state to all managed devices?")?;
                if !confirmed {
                    self.clean_artifacts().await;
                    info!("remediation declined, devices left untouched");
                    report::announce_declined();
                    return Ok(Outcome::DriftAcknowledged);
                }
                self.clean_artifacts().await;
                let reports = self.remediate_all().await;
                report::print_summary(
                    "Reversing OSPF configuration back into desired state",
                    &reports,
                );
                Ok(Outcome::Remediated(reports))
            }
        }
    }

    /// Push the desired state to every host, no drift check, no prompt.
    pub async fn apply(&self) -> Result<Vec<HostReport>> {
        let reports = runner::run_hosts(
            &self.connector,
            self.inventory.hosts.clone(),
            HostAction::Apply,
            &self.config.inventory.host_vars_dir,
            self.config.template.as_ref(),
            self.config.runner.num_workers,
        )
        .await;
        report::print_summary("Implementing OSPF desired state", &reports);
        Ok(reports)
    }

    async fn remediate_all(&self) -> Vec<HostReport> {
        runner::run_hosts(
            &self.connector,
            self.inventory.hosts.clone(),
            HostAction::Remediate,
            &self.config.inventory.host_vars_dir,
            self.config.template.as_ref(),
            self.config.runner.num_workers,
        )
        .await
    }

    /// Remove scratch artifacts. Best effort; a leftover directory is
    /// worth a warning, not a failed run.
    async fn clean_artifacts(&self) {
        for dir in [
            &self.config.paths.snapshot_dir,
            &self.config.paths.diff_dir,
        ] {
            match tokio::fs::remove_dir_all(dir).await {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => warn!("failed to remove scratch dir {}: {err}", dir.display()),
            }
        }
    }
}
