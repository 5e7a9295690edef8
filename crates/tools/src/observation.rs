//! The result of one tool call as the model will see it.

use clonekit_core::error::ToolError;
use clonekit_core::tool::ToolKind;

pub const TRUNCATION_MARKER: &str = "... [truncated]";

/// Outcome of a dispatched tool call.
///
/// Stays typed until [`Observation::into_observe_content`] renders it for
/// the OBSERVE message.
#[derive(Debug)]
pub struct Observation {
    pub tool: ToolKind,
    pub result: Result<String, ToolError>,
}

impl Observation {
    pub fn new(tool: ToolKind, result: Result<String, ToolError>) -> Self {
        Self { tool, result }
    }

    pub fn is_error(&self) -> bool {
        self.result.is_err()
    }

    /// Text for the OBSERVE message, at most `limit` characters plus the
    /// truncation marker.
    pub fn into_observe_content(self, limit: usize) -> String {
        let text = match self.result {
            Ok(text) => text,
            Err(e) => format!("Error: {e}"),
        };
        truncate(text, limit)
    }
}

/// Cut `text` to `limit` characters. The cut may land inside a JSON value.
fn truncate(text: String, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        None => text,
        Some((byte_index, _)) => {
            let mut cut = text[..byte_index].to_string();
            cut.push_str(TRUNCATION_MARKER);
            cut
        }
    }
}
