//! # clonekit Core
//!
//! Domain types, traits, and error definitions for the clonekit agent.
//! This crate has **no I/O of its own**. It defines the command protocol,
//! the tool catalogue, the page snapshot model and the traits that the
//! provider, browser and tool crates implement.
//!
//! ## Layout
//!
//! - [`command`]: the JSON-lines protocol spoken by the model
//! - [`tool`]: the closed catalogue of tools and their input shapes
//! - [`snapshot`]: captured pages and the [`PageCapture`] trait
//! - [`session`]: per-run state holding the latest snapshot
//! - [`provider`]: the completion-service abstraction

pub mod command;
pub mod error;
pub mod message;
pub mod provider;
pub mod session;
pub mod snapshot;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use command::{Command, ParsedResponse, Step, parse_response};
pub use error::{BundleError, CaptureError, Error, ProviderError, Result, ToolError};
pub use message::{Conversation, ConversationId, Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
pub use session::Session;
pub use snapshot::{ExternalStylesheet, ImageRef, PageCapture, PageSnapshot, Scripts, Stylesheets};
pub use tool::{Arity, Precondition, Tool, ToolInput, ToolKind};
