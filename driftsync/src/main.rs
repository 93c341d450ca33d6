use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use driftsync::config::AppConfig;
use driftsync::inventory::Inventory;
use driftsync::reconcile::{AssumeYes, Outcome, Reconciler, StdinConfirm};
use driftsync::session::ExecConnector;

#[derive(Parser)]
#[command(name = "driftsync")]
#[command(version, about = "OSPF configuration-drift detection and remediation.")]
struct CommandLine {
    /// Path to the application configuration file
    #[arg(short, long, default_value = "driftsync.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect drift and, on confirmation, remediate it
    #[command(alias = "r")]
    Reconcile {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Push the desired OSPF state to every host without checking for drift
    #[command(alias = "a")]
    Apply,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = CommandLine::parse();
    let config = AppConfig::load_or_default(&cli.config)?;
    let inventory = Inventory::load(&config.inventory.testbed_file)
        .context("failed to build the inventory")?;
    let connector = ExecConnector::new(config.executor.clone());
    let reconciler = Reconciler::new(config, inventory, connector);

    match cli.command.unwrap_or(Commands::Reconcile { yes: false }) {
        Commands::Reconcile { yes } => {
            let outcome = if yes {
                reconciler.run(&mut AssumeYes).await?
            } else {
                reconciler.run(&mut StdinConfirm).await?
            };
            if let Outcome::Remediated(reports) = outcome {
                let failed = reports.iter().filter(|r| !r.ok()).count();
                anyhow::ensure!(failed == 0, "{failed} host(s) failed remediation");
            }
        }
        Commands::Apply => {
            let reports = reconciler.apply().await?;
            let failed = reports.iter().filter(|r| !r.ok()).count();
            anyhow::ensure!(failed == 0, "{failed} host(s) failed to apply");
        }
    }

    Ok(())
}
