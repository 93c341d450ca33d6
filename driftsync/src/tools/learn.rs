//! Live-state capture via the external learning tool.

use std::ffi::OsString;
use std::path::PathBuf;

use log::info;

use super::run_tool;
use crate::config::ToolSpec;
use crate::error::Result;

/// Invokes the external learning capability for OSPF against a testbed
/// and persists a structured snapshot to the output directory.
#[derive(Debug, Clone)]
pub struct Snapshotter {
    spec: ToolSpec,
    testbed_file: PathBuf,
    output_dir: PathBuf,
}

impl Snapshotter {
    pub fn new(spec: ToolSpec, testbed_file: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            spec,
            testbed_file,
            output_dir,
        }
    }

    /// Capture a snapshot of live state into the output directory.
    ///
    /// The snapshot itself is only ever consumed by the diff tool; this
    /// call succeeds when the tool exits cleanly.
    pub async fn capture(&self) -> Result<()> {
        info!(
            "learning live OSPF state from {} into {}",
            self.testbed_file.display(),
            self.output_dir.display()
        );
        let args = [
            OsString::from("--testbed-file"),
            self.testbed_file.clone().into_os_string(),
            OsString::from("--output"),
            self.output_dir.clone().into_os_string(),
        ];
        run_tool(&self.spec, &args).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ToolError};

    #[tokio::test]
    async fn passes_testbed_and_output_paths() {
        let spec = ToolSpec {
            program: "sh".into(),
            args: vec!["-c".into(), r#"test "$1" = testbed.yaml && test "$3" = snap"#.into()],
        };
        let snapshotter = Snapshotter::new(spec, "testbed.yaml".into(), "snap".into());
        snapshotter.capture().await.unwrap();
    }

    #[tokio::test]
    async fn learning_failure_fails_the_run() {
        let spec = ToolSpec {
            program: "sh".into(),
            args: vec!["-c".into(), "echo 'device unreachable' >&2; exit 1".into()],
        };
        let snapshotter = Snapshotter::new(spec, "testbed.yaml".into(), "snap".into());
        let err = snapshotter.capture().await.unwrap_err();
        match err {
            Error::Tool(ToolError::Failed { stderr, .. }) => {
                assert_eq!(stderr, "device unreachable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
