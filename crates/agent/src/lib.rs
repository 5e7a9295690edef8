//! The agent: a model driven through the line-oriented command protocol.
//!
//! Each turn sends the bounded conversation to the provider, evaluates the
//! returned commands in order and feeds tool results back as OBSERVE
//! messages. The run ends when the model emits OUTPUT.

pub mod history;
pub mod interpreter;
pub mod prompt;

#[cfg(test)]
mod test_helpers;

pub use history::HistoryPolicy;
pub use interpreter::{Interpreter, RunOutcome, TurnOutcome};
pub use prompt::system_prompt;
