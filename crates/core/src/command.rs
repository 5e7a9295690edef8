//! The line-oriented command protocol spoken by the model.
//!
//! Every reply from the completion service is expected to contain one JSON
//! object per line:
//!
//! ```text
//! {"step":"THINK","content":"I should look at the page first"}
//! {"step":"TOOL","content":"analyse","tool_name":"analyzeWebsiteWithPuppeteer","input":"https://example.com"}
//! ```
//!
//! Anything that does not look like such an object is dropped without
//! interrupting the turn.

use serde::{Deserialize, Deserializer, Serialize};

/// The phase a command belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Step {
    Start,
    Think,
    Tool,
    Observe,
    Output,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Start => "START",
            Self::Think => "THINK",
            Self::Tool => "TOOL",
            Self::Observe => "OBSERVE",
            Self::Output => "OUTPUT",
        };
        f.write_str(label)
    }
}

/// One parsed protocol command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub step: Step,

    #[serde(default, deserialize_with = "lenient_text")]
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub input: Option<String>,
}

impl Command {
    /// Build the observation the agent feeds back after a tool call.
    pub fn observe(content: impl Into<String>) -> Self {
        Self {
            step: Step::Observe,
            content: content.into(),
            tool_name: None,
            input: None,
        }
    }

    /// Canonical single-line JSON form, as stored in the conversation.
    pub fn to_wire(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Models occasionally emit numbers or objects where text is expected; keep
/// their JSON form rather than rejecting the whole line.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_optional_text(deserializer)?.unwrap_or_default())
}

fn lenient_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

/// Result of parsing one completion.
#[derive(Debug, Clone, Default)]
pub struct ParsedResponse {
    /// Commands in the order they appeared.
    pub commands: Vec<Command>,

    /// Candidate lines (starting with `{`) that failed to deserialize.
    pub rejected: usize,
}

impl ParsedResponse {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Extract protocol commands from raw completion text.
///
/// Markdown code fences are removed, the text is split into lines, and only
/// lines that start with `{` are considered. Each candidate is parsed on its
/// own, so one malformed line never hides its neighbours.
pub fn parse_response(text: &str) -> ParsedResponse {
    let cleaned = strip_code_fences(text);
    let mut parsed = ParsedResponse::default();

    for line in cleaned.lines().map(str::trim).filter(|l| l.starts_with('{')) {
        match serde_json::from_str::<Command>(line) {
            Ok(command) => parsed.commands.push(command),
            Err(e) => {
                tracing::debug!(error = %e, line, "Dropping unparseable command line");
                parsed.rejected += 1;
            }
        }
    }

    parsed
}

fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "")
}
