//! # driftsync
//!
//! Configuration-drift detection and remediation for OSPF on network
//! devices.
//!
//! driftsync learns the live OSPF state of a testbed through an external
//! learning tool, diffs it against a declared desired state with an
//! external diff tool, and, after operator confirmation, tears down the
//! live OSPF processes and reapplies the desired state rendered from a
//! template. Transport to devices is owned by an out-of-process executor
//! tool; driftsync never speaks SSH itself.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use driftsync::config::AppConfig;
//! use driftsync::inventory::Inventory;
//! use driftsync::reconcile::{Outcome, Reconciler, StdinConfirm};
//! use driftsync::session::ExecConnector;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), driftsync::Error> {
//!     let config = AppConfig::default();
//!     let inventory = Inventory::load(&config.inventory.testbed_file)?;
//!     let connector = ExecConnector::new(config.executor.clone());
//!
//!     let reconciler = Reconciler::new(config, inventory, connector);
//!     match reconciler.run(&mut StdinConfirm).await? {
//!         Outcome::Converged => println!("already in sync"),
//!         Outcome::DriftAcknowledged => println!("drift left in place"),
//!         Outcome::Remediated(reports) => println!("{} host(s) reconciled", reports.len()),
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod desired;
pub mod error;
pub mod inventory;
pub mod reconcile;
pub mod remediate;
pub mod report;
pub mod runner;
pub mod session;
pub mod tools;

// Re-export main types for convenience
pub use error::Error;
pub use inventory::{Host, Inventory};
pub use reconcile::{Confirm, Outcome, Reconciler};
pub use report::{HostReport, StepReport};
pub use session::{CommandOutput, Connector, ExecConnector, Session};
pub use tools::{DiffReport, Differ, Snapshotter};
