//! Tools the agent can call, and the dispatcher that routes to them.
//!
//! Plain tools implement [`clonekit_core::Tool`] and act on their input
//! alone: weather and GitHub lookups, shell commands, page fetches, HTML
//! summaries and file writes. Page analysis and the four bundle generators
//! work on the session's snapshot and are driven by [`Dispatcher`] directly.

pub mod dispatcher;
pub mod download_asset;
pub mod file_write;
pub mod github_user;
pub mod html_parse;
pub mod observation;
pub mod shell;
pub mod weather_lookup;
pub mod web_fetch;

#[cfg(test)]
pub(crate) mod test_support;

pub use dispatcher::{DispatchError, Dispatcher};
pub use observation::{Observation, TRUNCATION_MARKER};
