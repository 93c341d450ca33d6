//! External tool invocation.
//!
//! The learning and diff capabilities are pre-built tools driven out of
//! process with file-path arguments. Exit status and stderr are always
//! captured; a tool that exits non-zero fails the run.

mod diff;
mod learn;

pub use diff::{DRIFT_MARKER, DiffReport, Differ};
pub use learn::Snapshotter;

use std::ffi::OsString;

use log::debug;
use tokio::process::Command;

use crate::config::ToolSpec;
use crate::error::{Result, ToolError};

/// Captured output of one tool invocation.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// Stdout followed by stderr, for marker scanning.
    pub fn combined(&self) -> String {
        let mut combined = self.stdout.clone();
        combined.push_str(&self.stderr);
        combined
    }
}

/// Run a tool to completion with `extra_args` appended to its fixed
/// arguments.
pub(crate) async fn run_tool(spec: &ToolSpec, extra_args: &[OsString]) -> Result<ToolOutput> {
    debug!("running '{}' {:?} {:?}", spec.program, spec.args, extra_args);
    let output = Command::new(&spec.program)
        .args(&spec.args)
        .args(extra_args)
        .output()
        .await
        .map_err(|source| ToolError::Spawn {
            program: spec.program.clone(),
            source,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        return Err(ToolError::Failed {
            program: spec.program.clone(),
            status: output.status,
            stderr: stderr.trim().to_string(),
        }
        .into());
    }

    Ok(ToolOutput { stdout, stderr })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn spec(program: &str, args: &[&str]) -> ToolSpec {
        ToolSpec {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn captures_stdout_and_stderr() {
        let output = run_tool(
            &spec("sh", &["-c", "echo out; echo err >&2"]),
            &[],
        )
        .await
        .unwrap();
        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.combined(), "out\nerr\n");
    }

    #[tokio::test]
    async fn extra_args_are_appended() {
        let output = run_tool(
            &spec("sh", &["-c", r#"echo "$0 $1""#]),
            &[OsString::from("--output"), OsString::from("scratch")],
        )
        .await
        .unwrap();
        assert_eq!(output.stdout, "--output scratch\n");
    }

    #[tokio::test]
    async fn nonzero_exit_fails_the_run() {
        let err = run_tool(&spec("sh", &["-c", "echo broken >&2; exit 2"]), &[])
            .await
            .unwrap_err();
        match err {
            Error::Tool(ToolError::Failed { stderr, .. }) => assert_eq!(stderr, "broken"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_binary_fails_to_spawn() {
        let err = run_tool(&spec("driftsync-no-such-tool", &[]), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Tool(ToolError::Spawn { .. })));
    }
}
