//! Fakes for the dispatcher's collaborators.

use std::collections::HashMap;

use async_trait::async_trait;
use clonekit_bundle::AssetSource;
use clonekit_core::error::{BundleError, CaptureError};
use clonekit_core::snapshot::{ImageRef, PageCapture, PageSnapshot};

/// Serves a fixed set of URLs; everything else is a 404.
#[derive(Default)]
pub struct StaticAssets {
    bodies: HashMap<String, Vec<u8>>,
}

impl StaticAssets {
    pub fn with(entries: &[(&str, &str)]) -> Self {
        Self {
            bodies: entries
                .iter()
                .map(|(url, body)| (url.to_string(), body.as_bytes().to_vec()))
                .collect(),
        }
    }
}

#[async_trait]
impl AssetSource for StaticAssets {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, BundleError> {
        self.bodies.get(url).cloned().ok_or_else(|| BundleError::Fetch {
            url: url.to_string(),
            reason: "HTTP 404".into(),
        })
    }
}

/// Returns the same snapshot for every URL, or always fails.
pub struct FakeCapture {
    snapshot: Option<PageSnapshot>,
}

impl FakeCapture {
    pub fn ok(snapshot: PageSnapshot) -> Self {
        Self {
            snapshot: Some(snapshot),
        }
    }

    pub fn failing() -> Self {
        Self { snapshot: None }
    }
}

#[async_trait]
impl PageCapture for FakeCapture {
    async fn capture(&self, url: &str) -> Result<PageSnapshot, CaptureError> {
        match &self.snapshot {
            Some(snapshot) => Ok(PageSnapshot {
                url: url.to_string(),
                ..snapshot.clone()
            }),
            None => Err(CaptureError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".into(),
            }),
        }
    }
}

pub fn sample_snapshot() -> PageSnapshot {
    PageSnapshot {
        raw_markup: r#"<html><head><meta name="description" content="Sample page"></head><body></body></html>"#
            .into(),
        post_script_markup: r#"<main><img src="https://x.dev/a.png"><img src="https://x.dev/b"></main>"#
            .into(),
        images: vec![
            ImageRef {
                src: "https://x.dev/a.png".into(),
                ..ImageRef::default()
            },
            ImageRef {
                src: "https://x.dev/b".into(),
                ..ImageRef::default()
            },
        ],
        title: "Sample".into(),
        url: "https://x.dev/".into(),
        ..PageSnapshot::default()
    }
}
