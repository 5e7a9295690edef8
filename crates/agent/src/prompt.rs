//! The system prompt that teaches the model the command protocol.

use clonekit_core::error::Error;
use clonekit_core::tool::{Precondition, ToolKind};
use serde::Serialize;
use tera::{Context, Tera};

const SYSTEM_TEMPLATE: &str = include_str!("prompts/system.md");

#[derive(Serialize)]
struct ToolLine {
    signature: &'static str,
    description: &'static str,
    requires_snapshot: bool,
}

#[derive(Serialize)]
struct PromptContext<'a> {
    tools: Vec<ToolLine>,
    bundle_root: &'a str,
    observe_limit: usize,
}

/// Render the system prompt, listing every tool in the catalogue.
pub fn system_prompt(bundle_root: &str, observe_limit: usize) -> Result<String, Error> {
    let context = PromptContext {
        tools: ToolKind::ALL
            .into_iter()
            .map(|kind| ToolLine {
                signature: kind.signature(),
                description: kind.description(),
                requires_snapshot: kind.precondition() == Precondition::RequiresSnapshot,
            })
            .collect(),
        bundle_root,
        observe_limit,
    };

    let mut tera = Tera::default();
    tera.add_raw_template("system", SYSTEM_TEMPLATE)
        .and_then(|_| Context::from_serialize(&context))
        .and_then(|ctx| tera.render("system", &ctx))
        .map_err(|e| Error::Internal(format!("failed to render system prompt: {e}")))
}
