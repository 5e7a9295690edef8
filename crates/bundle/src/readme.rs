//! `README.md` generation.

use chrono::{DateTime, Utc};
use clonekit_core::error::BundleError;
use clonekit_core::snapshot::PageSnapshot;
use serde::Serialize;

use crate::template::{self, README_MD};

#[derive(Serialize)]
struct ReadmeContext<'a> {
    title: &'a str,
    url: &'a str,
    root: String,
    image_count: usize,
    stylesheet_count: usize,
    script_count: usize,
    generated_at: String,
}

/// Usage notes for the bundle rooted at `root`.
///
/// `generated_at` is the only input that is not taken from the snapshot.
pub fn generate_readme(
    snapshot: &PageSnapshot,
    root: &str,
    generated_at: DateTime<Utc>,
) -> Result<String, BundleError> {
    let context = ReadmeContext {
        title: snapshot.title_or_default(),
        url: &snapshot.url,
        root: root.trim_end_matches('/').to_string(),
        image_count: snapshot.images.len(),
        stylesheet_count: snapshot.stylesheets.external.len(),
        script_count: snapshot.scripts.external.len(),
        generated_at: generated_at.to_rfc3339(),
    };
    template::render("README.md", README_MD, &context)
}
