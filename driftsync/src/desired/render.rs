//! Template rendering for the desired command sequence.
//!
//! The template is an external Jinja2 file; rendering is delegated to
//! the engine and the output is taken literally, split into lines for
//! the executor.

use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

use minijinja::Environment;
use serde::Serialize;

use super::declaration::{OspfDeclaration, RenderedNetwork, expand_networks};
use crate::error::{DesiredError, Result};

const TEMPLATE_NAME: &str = "ospf";

/// Values exposed to the template.
#[derive(Debug, Serialize)]
struct RenderContext {
    process: u32,
    area: u32,
    router_id: Option<Ipv4Addr>,
    networks: Vec<RenderedNetwork>,
}

/// Render `decl` through the template file at `path`.
pub fn render_config(path: &Path, decl: &OspfDeclaration) -> Result<String> {
    let source = fs::read_to_string(path).map_err(|source| DesiredError::TemplateRead {
        path: path.to_path_buf(),
        source,
    })?;
    render_str(&source, decl)
}

/// Render `decl` through an in-memory template source.
pub fn render_str(source: &str, decl: &OspfDeclaration) -> Result<String> {
    let context = RenderContext {
        process: decl.process,
        area: decl.area,
        router_id: decl.router_id,
        networks: expand_networks(decl)?,
    };

    let mut env = Environment::new();
    env.add_template(TEMPLATE_NAME, source)
        .map_err(DesiredError::Render)?;
    let template = env.get_template(TEMPLATE_NAME).map_err(DesiredError::Render)?;
    let rendered = template.render(&context).map_err(DesiredError::Render)?;
    Ok(rendered)
}

/// Split rendered text into the command lines to push.
///
/// Blank lines are dropped; indentation is kept as rendered.
pub fn command_lines(rendered: &str) -> Vec<String> {
    rendered
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim_end().to_string())
        .collect()
}
