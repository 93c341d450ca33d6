//! Per-run reporting.
//!
//! Reports are plain data collected while working a host; rendering to
//! the terminal lives here too so every command prints results the same
//! way.

use colored::Colorize;

use crate::session::CommandOutput;

const RULE_WIDTH: usize = 70;

/// One executed step on one host.
#[derive(Debug, Clone)]
pub struct StepReport {
    pub name: String,
    pub output: Option<CommandOutput>,
}

impl StepReport {
    /// A step that ran no device command.
    pub fn note(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            output: None,
        }
    }

    pub fn with_output(name: impl Into<String>, output: CommandOutput) -> Self {
        Self {
            name: name.into(),
            output: Some(output),
        }
    }

    pub fn ok(&self) -> bool {
        self.output.as_ref().is_none_or(CommandOutput::is_success)
    }
}

/// Everything that happened on one host during a run.
#[derive(Debug, Clone)]
pub struct HostReport {
    pub host: String,
    pub steps: Vec<StepReport>,
    pub error: Option<String>,
}

impl HostReport {
    pub fn new(host: impl Into<String>, steps: Vec<StepReport>) -> Self {
        Self {
            host: host.into(),
            steps,
            error: None,
        }
    }

    /// A host whose sequence aborted before completing.
    pub fn failed(host: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            steps: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn ok(&self) -> bool {
        self.error.is_none() && self.steps.iter().all(StepReport::ok)
    }
}

fn rule(c: char) -> String {
    c.to_string().repeat(RULE_WIDTH)
}

/// First line of a possibly multi-line command, with a count of the rest.
fn summarize(command: &str) -> String {
    let mut lines = command.lines();
    let first = lines.next().unwrap_or_default();
    let rest = lines.count();
    if rest == 0 {
        first.to_string()
    } else {
        format!("{first} (+{rest} more)")
    }
}

/// Render the per-host summary for a completed fan-out.
pub fn print_summary(title: &str, reports: &[HostReport]) {
    println!();
    println!("{}", rule('=').cyan());
    println!("{}", title.to_uppercase().bold());
    println!("{}", rule('=').cyan());

    for report in reports {
        let status = if report.ok() {
            "OK".green().bold()
        } else {
            "FAILED".red().bold()
        };
        println!("{} {} {}", "*".cyan(), report.host.bold(), status);
        for step in &report.steps {
            let symbol = if step.ok() {
                "[+]".green()
            } else {
                "[-]".red()
            };
            match &step.output {
                Some(out) => {
                    println!("  {symbol} {}: {}", step.name, summarize(&out.command));
                    if let Some(message) = &out.failure_message {
                        println!("      {}", message.red());
                    }
                }
                None => println!("  {symbol} {}", step.name),
            }
        }
        if let Some(error) = &report.error {
            println!("  {} {}", "[-]".red(), error.red());
        }
    }

    let failed = reports.iter().filter(|r| !r.ok()).count();
    let line = format!("{} host(s), {} failed", reports.len(), failed);
    if failed == 0 {
        println!("{}", line.green());
    } else {
        println!("{}", line.red().bold());
    }
}

/// Banner for detected drift.
pub fn alert_drift(location: Option<&str>) {
    println!("{}", rule('#').cyan());
    println!(
        "{} current OSPF configuration is not in sync with the desired state",
        "ALERT:".red().bold()
    );
    if let Some(location) = location {
        println!("{location}");
    }
    println!("{}", rule('#').cyan());
}

/// Confirmation that live and desired state match.
pub fn announce_in_sync() {
    println!("{}", rule('*'));
    println!(
        "{}",
        "OSPF configuration matches the desired state".green()
    );
    println!("{}", rule('*'));
}

/// Operator saw the drift and chose to leave the devices alone.
pub fn announce_declined() {
    println!("{}", "Drift acknowledged, no changes applied".yellow());
}
