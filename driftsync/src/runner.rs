//! Per-host fan-out.
//!
//! Hosts are worked independently with at most `num_workers` in flight.
//! There is no ordering between hosts and no shared mutable state; each
//! host record is moved into its task. A failing host is contained to
//! its own report and never aborts the rest.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::desired;
use crate::error::Result;
use crate::inventory::Host;
use crate::remediate;
use crate::report::HostReport;
use crate::session::Connector;

/// What to run against each host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostAction {
    /// Tear down live OSPF processes, then reapply the desired state.
    Remediate,

    /// Push the desired state without touching what is live.
    Apply,
}

/// Fan `action` out across `hosts`.
///
/// Returns one report per host, sorted by host name for stable output.
pub async fn run_hosts<C>(
    connector: &C,
    hosts: Vec<Host>,
    action: HostAction,
    host_vars_dir: &Path,
    template_path: &Path,
    num_workers: usize,
) -> Vec<HostReport>
where
    C: Connector + Clone + 'static,
{
    let semaphore = Arc::new(Semaphore::new(num_workers.max(1)));
    let mut tasks = JoinSet::new();

    for mut host in hosts {
        let connector = connector.clone();
        let semaphore = semaphore.clone();
        let host_vars_dir: PathBuf = host_vars_dir.to_path_buf();
        let template_path: PathBuf = template_path.to_path_buf();

        tasks.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return HostReport::failed(host.name.clone(), "worker pool closed");
            };
            let name = host.name.clone();
            match run_one(&connector, &mut host, action, &host_vars_dir, &template_path).await {
                Ok(report) => report,
                Err(err) => HostReport::failed(name, err.to_string()),
            }
        });
    }

    let mut reports = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(report) => reports.push(report),
            Err(err) => error!("host task aborted: {err}"),
        }
    }
    reports.sort_by(|a, b| a.host.cmp(&b.host));
    reports
}

async fn run_one<C: Connector>(
    connector: &C,
    host: &mut Host,
    action: HostAction,
    host_vars_dir: &Path,
    template_path: &Path,
) -> Result<HostReport> {
    let mut session = connector.connect(host).await?;
    match action {
        HostAction::Remediate => {
            remediate::remediate_host(&mut session, host, host_vars_dir, template_path).await
        }
        HostAction::Apply => {
            let steps =
                desired::apply_desired(&mut session, host, host_vars_dir, template_path).await?;
            Ok(HostReport::new(host.name.clone(), steps))
        }
    }
}
