//! Desired-vs-live comparison via the external diff tool.

use std::ffi::OsString;
use std::path::PathBuf;

use log::info;

use super::run_tool;
use crate::config::ToolSpec;
use crate::error::Result;

/// Marker the diff tool prints when the compared snapshots differ.
///
/// This is the tool's only stable signal; a phrasing change there
/// breaks detection, so the contract is pinned here next to its tests.
pub const DRIFT_MARKER: &str = "Diff can be found";

/// Typed result of a desired-vs-live comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffReport {
    /// Live state matches the desired state.
    InSync,

    /// Live state diverges; `location` is the marker line from the tool
    /// output, pointing at the written diff.
    Drift { location: Option<String> },
}

impl DiffReport {
    /// Parse the diff tool's combined output.
    pub fn parse(output: &str) -> Self {
        for line in output.lines() {
            if line.contains(DRIFT_MARKER) {
                return Self::Drift {
                    location: Some(line.trim().to_string()),
                };
            }
        }
        Self::InSync
    }

    pub fn is_drift(&self) -> bool {
        matches!(self, Self::Drift { .. })
    }
}

/// Invokes the external comparison between the desired-state directory
/// and the live snapshot.
#[derive(Debug, Clone)]
pub struct Differ {
    spec: ToolSpec,
    desired_dir: PathBuf,
    snapshot_dir: PathBuf,
    output_dir: PathBuf,
}

impl Differ {
    pub fn new(
        spec: ToolSpec,
        desired_dir: PathBuf,
        snapshot_dir: PathBuf,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            spec,
            desired_dir,
            snapshot_dir,
            output_dir,
        }
    }

    /// Run the comparison and parse its output into a typed report.
    pub async fn compare(&self) -> Result<DiffReport> {
        let args = [
            self.desired_dir.clone().into_os_string(),
            self.snapshot_dir.clone().into_os_string(),
            OsString::from("--output"),
            self.output_dir.clone().into_os_string(),
        ];
        let output = run_tool(&self.spec, &args).await?;
        let report = DiffReport::parse(&output.combined());
        match &report {
            DiffReport::InSync => info!("live OSPF state matches the desired state"),
            DiffReport::Drift { location } => info!(
                "drift detected{}",
                location
                    .as_deref()
                    .map(|l| format!(" ({l})"))
                    .unwrap_or_default()
            ),
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_means_drift() {
        let report = DiffReport::parse(
            "Comparing desired-ospf/ with ospf-current/\nDiff can be found at ospfdiff/diff_r1\n",
        );
        assert!(report.is_drift());
        assert_eq!(
            report,
            DiffReport::Drift {
                location: Some("Diff can be found at ospfdiff/diff_r1".to_string())
            }
        );
    }

    #[test]
    fn anything_else_means_in_sync() {
        for output in [
            "",
            "Comparing snapshots... no differences\n",
            "diff complete\nall devices matched\n",
        ] {
            assert_eq!(DiffReport::parse(output), DiffReport::InSync);
        }
    }

    #[test]
    fn marker_is_found_mid_output() {
        let report =
            DiffReport::parse("warning: slow device\nsomething\nDiff can be found in x\ntail\n");
        assert!(report.is_drift());
    }

    #[tokio::test]
    async fn compare_feeds_directories_and_parses_output() {
        let spec = ToolSpec {
            program: "sh".into(),
            args: vec![
                "-c".into(),
                r#"echo "comparing $0 with $1"; echo "Diff can be found at $3/diff""#.into(),
            ],
        };
        let differ = Differ::new(spec, "desired".into(), "current".into(), "scratch".into());
        let report = differ.compare().await.unwrap();
        assert_eq!(
            report,
            DiffReport::Drift {
                location: Some("Diff can be found at scratch/diff".to_string())
            }
        );
    }

    #[tokio::test]
    async fn clean_compare_reports_in_sync() {
        let spec = ToolSpec {
            program: "sh".into(),
            args: vec!["-c".into(), "echo identical".into()],
        };
        let differ = Differ::new(spec, "desired".into(), "current".into(), "scratch".into());
        assert_eq!(differ.compare().await.unwrap(), DiffReport::InSync);
    }
}
