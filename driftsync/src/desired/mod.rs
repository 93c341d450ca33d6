//! Desired-state provider.
//!
//! Loads a host's declared OSPF parameters, renders them through the
//! template into a literal command sequence, and pushes that sequence
//! to the device.

mod declaration;
mod render;

pub use declaration::{
    NetworkDecl, OspfDeclaration, RenderedNetwork, expand_networks, load_declaration,
};
pub use render::{command_lines, render_config, render_str};

use std::path::Path;

use log::info;
use serde_yaml::Value;

use crate::error::{DesiredError, Result};
use crate::inventory::Host;
use crate::report::StepReport;
use crate::session::Session;

/// Load, render, and push the desired OSPF state for one host.
///
/// The declaration and the rendered text are bound into the host's
/// attribute bag under `OSPF` and `config`. Returns the executed steps
/// for reporting. Any failure here is fatal for the host and is
/// propagated without substituting defaults.
pub async fn apply_desired<S: Session>(
    session: &mut S,
    host: &mut Host,
    host_vars_dir: &Path,
    template_path: &Path,
) -> Result<Vec<StepReport>> {
    let mut steps = Vec::new();

    let decl = load_declaration(host_vars_dir, &host.name)?;
    host.insert("OSPF", serde_yaml::to_value(&decl).map_err(DesiredError::Bind)?);
    steps.push(StepReport::note("Pulling definition file"));

    let rendered = render_config(template_path, &decl)?;
    let lines = command_lines(&rendered);
    host.insert("config", Value::String(rendered));
    steps.push(StepReport::note("Building desired state"));

    info!(
        "{}: implementing desired OSPF state, process {}",
        host.name, decl.process
    );
    let output = session.send_config(&lines).await?;
    steps.push(StepReport::with_output("Implementing desired state", output));

    Ok(steps)
}
