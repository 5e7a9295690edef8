//! Page capture for clonekit.
//!
//! Renders a URL in headless Chrome, lets its scripts run, and turns what
//! the browser sees into a [`PageSnapshot`](clonekit_core::PageSnapshot).

pub mod chrome;

pub use chrome::{CaptureSettings, ChromeCapture};
