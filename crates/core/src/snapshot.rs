//! Page snapshots and the capture abstraction that produces them.
//!
//! A snapshot is the read-only input of every bundle generator. It is
//! produced by a [`PageCapture`] and kept in the [`Session`](crate::session::Session)
//! until the next successful analysis replaces it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::CaptureError;

/// Everything captured from one rendered page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    /// Full document markup after scripts ran.
    #[serde(rename = "html", default)]
    pub raw_markup: String,

    /// `document.body.innerHTML` after scripts ran.
    #[serde(rename = "bodyContent", default)]
    pub post_script_markup: String,

    #[serde(default)]
    pub stylesheets: Stylesheets,

    #[serde(default)]
    pub scripts: Scripts,

    #[serde(default)]
    pub images: Vec<ImageRef>,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub url: String,
}

impl PageSnapshot {
    /// Body markup to clone; falls back to the full document.
    pub fn body_markup(&self) -> &str {
        if self.post_script_markup.is_empty() {
            &self.raw_markup
        } else {
            &self.post_script_markup
        }
    }

    /// Page title, or a generic label when the page had none.
    pub fn title_or_default(&self) -> &str {
        if self.title.trim().is_empty() {
            "Cloned Website"
        } else {
            &self.title
        }
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        format!(
            "{} images, {} external stylesheets, {} external scripts",
            self.images.len(),
            self.stylesheets.external.len(),
            self.scripts.external.len()
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stylesheets {
    #[serde(default)]
    pub external: Vec<ExternalStylesheet>,

    /// Contents of every `<style>` element.
    #[serde(default)]
    pub inline: Vec<String>,
}

/// A `<link rel="stylesheet">` and, when the page could fetch it, its body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalStylesheet {
    pub href: String,

    #[serde(default)]
    pub content: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scripts {
    /// Absolute `src` of every external script.
    #[serde(default)]
    pub external: Vec<String>,

    #[serde(default)]
    pub inline: Vec<String>,
}

/// An `<img>` element as the browser resolved it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    #[serde(default)]
    pub src: String,

    #[serde(default)]
    pub alt: String,

    #[serde(rename = "className", default)]
    pub class_name: String,
}

impl ImageRef {
    /// Only absolute remote images are downloaded and rewritten.
    pub fn is_remote(&self) -> bool {
        self.src.starts_with("http")
    }
}

/// Loads a page in a real browser and reports what it rendered.
#[async_trait]
pub trait PageCapture: Send + Sync {
    async fn capture(&self, url: &str) -> std::result::Result<PageSnapshot, CaptureError>;
}
