//! `index.html` generation.
//!
//! The page body comes from the snapshot with every reference to a remote
//! image pointed at the file the downloader writes for it. Stylesheets and
//! scripts that the downloader fetches are linked from `assets/` as well.

use clonekit_core::error::BundleError;
use clonekit_core::snapshot::PageSnapshot;
use regex_lite::{Captures, Regex};
use reqwest::Url;
use scraper::{Html, Selector};
use serde::Serialize;
use tracing::debug;

use crate::layout::ASSETS_DIR;
use crate::naming::{derive_image_filename, derive_script_filename, derive_stylesheet_filename};
use crate::template::{self, INDEX_HTML};

const IMAGE_ATTRIBUTE: &str = r#"(src|srcset)=["']([^"']*)["']"#;

/// Path of a downloaded asset as referenced from `index.html`.
pub fn asset_href(filename: &str) -> String {
    format!("{ASSETS_DIR}/{}", urlencoding::encode(filename))
}

#[derive(Debug, Serialize)]
struct MetaTag {
    attribute: &'static str,
    key: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct IndexPage {
    title: String,
    meta_tags: Vec<MetaTag>,
    stylesheet_links: Vec<String>,
    script_links: Vec<String>,
    body: String,
}

/// Build the complete `index.html` for `snapshot`.
pub fn generate_html(snapshot: &PageSnapshot) -> Result<String, BundleError> {
    let body = rewrite_image_references(snapshot)?;

    let stylesheet_links = snapshot
        .stylesheets
        .external
        .iter()
        .enumerate()
        .filter(|(_, sheet)| sheet.href.starts_with("http"))
        .map(|(i, sheet)| asset_href(&derive_stylesheet_filename(&sheet.href, i)))
        .collect();

    let script_links = snapshot
        .scripts
        .external
        .iter()
        .enumerate()
        .filter(|(_, src)| src.starts_with("http"))
        .map(|(i, src)| asset_href(&derive_script_filename(src, i)))
        .collect();

    let page = IndexPage {
        title: snapshot.title_or_default().to_string(),
        meta_tags: extract_meta_tags(&snapshot.raw_markup),
        stylesheet_links,
        script_links,
        body,
    };

    template::render("index.html", INDEX_HTML, &page)
}

/// A remote image and where it ends up locally.
struct ImageTarget<'a> {
    src: &'a str,
    canonical: Option<Url>,
    href: String,
}

fn rewrite_image_references(snapshot: &PageSnapshot) -> Result<String, BundleError> {
    let body = snapshot.body_markup();
    let base = Url::parse(&snapshot.url).ok();

    let targets: Vec<ImageTarget<'_>> = snapshot
        .images
        .iter()
        .enumerate()
        .filter(|(_, image)| image.is_remote())
        .map(|(i, image)| ImageTarget {
            src: &image.src,
            canonical: canonical_url(&image.src, base.as_ref()),
            href: asset_href(&derive_image_filename(image, i)),
        })
        .collect();

    if targets.is_empty() {
        return Ok(body.to_string());
    }

    let pattern = Regex::new(IMAGE_ATTRIBUTE)
        .map_err(|e| BundleError::Template(format!("image attribute pattern: {e}")))?;

    let mut rewritten = 0usize;
    let out = pattern.replace_all(body, |caps: &Captures<'_>| {
        let attribute = &caps[1];
        match match_target(&caps[2], &targets, base.as_ref()) {
            Some(target) => {
                rewritten += 1;
                format!("{attribute}=\"{}\"", target.href)
            }
            None => caps[0].to_string(),
        }
    });

    debug!(images = targets.len(), rewritten, "Rewrote image references");
    Ok(out.into_owned())
}

/// Find the image an attribute value refers to.
///
/// Each `srcset` candidate (or the plain `src`) is canonicalized and
/// compared first. A value that merely contains a target's URL matches
/// as a fallback.
fn match_target<'t, 'a>(
    value: &str,
    targets: &'t [ImageTarget<'a>],
    base: Option<&Url>,
) -> Option<&'t ImageTarget<'a>> {
    let decoded = value.replace("&amp;", "&");

    for candidate in decoded.split(',') {
        let Some(reference) = candidate.split_whitespace().next() else {
            continue;
        };
        let Some(url) = canonical_url(reference, base) else {
            continue;
        };
        if let Some(target) = targets.iter().find(|t| t.canonical.as_ref() == Some(&url)) {
            return Some(target);
        }
    }

    targets.iter().find(|t| decoded.contains(t.src))
}

/// Absolute form of an image reference with any `/_next/image` resizing
/// wrapper removed.
fn canonical_url(reference: &str, base: Option<&Url>) -> Option<Url> {
    let mut url = match base {
        Some(base) => base.join(reference.trim()).ok()?,
        None => Url::parse(reference.trim()).ok()?,
    };

    if url.path().ends_with("/_next/image") {
        let inner = url
            .query_pairs()
            .find(|(key, _)| key == "url")
            .map(|(_, value)| value.into_owned());
        if let Some(inner) = inner {
            url = url.join(&inner).ok()?;
        }
    }

    url.set_fragment(None);
    Some(url)
}

/// `<meta>` tags of the original document worth carrying over.
fn extract_meta_tags(markup: &str) -> Vec<MetaTag> {
    if markup.is_empty() {
        return Vec::new();
    }
    let Ok(selector) = Selector::parse("meta") else {
        return Vec::new();
    };

    let document = Html::parse_document(markup);
    document
        .select(&selector)
        .filter_map(|element| {
            let meta = element.value();
            let (attribute, key) = match (meta.attr("name"), meta.attr("property")) {
                (Some(name), _) if !name.is_empty() => ("name", name),
                (_, Some(property)) if !property.is_empty() => ("property", property),
                _ => return None,
            };
            // the template already sets the viewport
            if key.eq_ignore_ascii_case("viewport") {
                return None;
            }
            let content = meta.attr("content").filter(|c| !c.is_empty())?;
            Some(MetaTag {
                attribute,
                key: key.to_string(),
                content: content.to_string(),
            })
        })
        .collect()
}
