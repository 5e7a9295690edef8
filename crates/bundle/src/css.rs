//! `styles.css` generation.

use clonekit_core::snapshot::PageSnapshot;
use serde::Serialize;
use tracing::warn;

use crate::template::{self, FALLBACK_CSS, STYLES_CSS};

#[derive(Serialize)]
struct StylesheetHeader {
    url: String,
    title: String,
}

/// Base stylesheet annotated with the page's url and title.
///
/// Never fails: a render error yields the minimal fallback stylesheet.
pub fn generate_css(snapshot: &PageSnapshot) -> String {
    let header = StylesheetHeader {
        url: comment_safe(&snapshot.url),
        title: comment_safe(snapshot.title_or_default()),
    };

    render_or_fallback(STYLES_CSS, &header)
}

fn render_or_fallback(source: &str, header: &StylesheetHeader) -> String {
    match template::render("styles.css", source, header) {
        Ok(css) => css,
        Err(e) => {
            warn!(error = %e, "Falling back to minimal stylesheet");
            fallback_css().to_string()
        }
    }
}

pub fn fallback_css() -> &'static str {
    FALLBACK_CSS
}

/// Keep interpolated text from closing the surrounding comment.
fn comment_safe(text: &str) -> String {
    text.replace("*/", "* /")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> PageSnapshot {
        PageSnapshot {
            url: "https://x.dev/".into(),
            title: "Portfolio".into(),
            ..PageSnapshot::default()
        }
    }

    #[test]
    fn header_names_source_page() {
        let css = generate_css(&snapshot());
        assert!(css.contains("/* Source: https://x.dev/ */"));
        assert!(css.contains("/* Title: Portfolio */"));
        assert!(css.contains("--primary-color"));
    }

    #[test]
    fn output_is_stable_for_unchanged_snapshot() {
        let snap = snapshot();
        let before = snap.clone();
        assert_eq!(generate_css(&snap), generate_css(&snap));
        assert_eq!(snap, before);
    }

    #[test]
    fn comment_terminators_are_neutralized() {
        let mut snap = snapshot();
        snap.title = "evil */ body { display: none }".into();
        let css = generate_css(&snap);
        assert!(css.contains("/* Title: evil * / body { display: none } */"));
    }

    #[test]
    fn broken_template_yields_fallback() {
        let header = StylesheetHeader {
            url: "https://x.dev/".into(),
            title: "Portfolio".into(),
        };
        let css = render_or_fallback("/* Source: {{ url */", &header);
        assert_eq!(css, fallback_css());

        let css = render_or_fallback("/* {{ missing_field }} */", &header);
        assert_eq!(css, fallback_css());
    }

    #[test]
    fn fallback_is_plain_css() {
        assert!(fallback_css().contains("box-sizing: border-box"));
        assert!(!fallback_css().contains("{{"));
    }
}
