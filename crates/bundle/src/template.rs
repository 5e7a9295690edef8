//! Tera rendering for the bundled templates.

use clonekit_core::error::BundleError;
use serde::Serialize;
use tera::{Context, Tera};

pub(crate) const INDEX_HTML: &str = include_str!("templates/index.html");
pub(crate) const STYLES_CSS: &str = include_str!("templates/styles.css");
pub(crate) const FALLBACK_CSS: &str = include_str!("templates/fallback.css");
pub(crate) const README_MD: &str = include_str!("templates/README.md");
pub(crate) const SCRIPT_JS: &str = include_str!("templates/script.js");

/// Render `source` with `data` as context.
///
/// Tera autoescapes templates named `*.html`; markup that is already safe
/// must be marked with `| safe` there.
pub(crate) fn render<T: Serialize>(name: &str, source: &str, data: &T) -> Result<String, BundleError> {
    let mut tera = Tera::default();
    tera.add_raw_template(name, source)
        .map_err(|e| template_error(name, e))?;
    let context = Context::from_serialize(data).map_err(|e| template_error(name, e))?;
    tera.render(name, &context).map_err(|e| template_error(name, e))
}

fn template_error(name: &str, err: tera::Error) -> BundleError {
    // tera keeps the useful part of the message in the source chain
    let mut message = format!("{name}: {err}");
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    BundleError::Template(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn html_templates_escape_unless_marked_safe() {
        let mut ctx = HashMap::new();
        ctx.insert("body", "<p>a&b</p>");
        let out = render("t.html", "<div>{{ body }}</div>{{ body | safe }}", &ctx).unwrap();
        assert_eq!(out, "<div>&lt;p&gt;a&amp;b&lt;&#x2F;p&gt;</div><p>a&b</p>");
    }

    #[test]
    fn other_templates_render_raw() {
        let mut ctx = HashMap::new();
        ctx.insert("title", "a <b> & c");
        let out = render("t.md", "# {{ title }}", &ctx).unwrap();
        assert_eq!(out, "# a <b> & c");
    }

    #[test]
    fn missing_variable_is_a_template_error() {
        let ctx: HashMap<&str, &str> = HashMap::new();
        let err = render("t", "{{ nope }}", &ctx).unwrap_err();
        assert!(matches!(err, BundleError::Template(ref m) if m.starts_with("t:")));
    }

    #[test]
    fn bundled_templates_parse() {
        for (name, source) in [
            ("index.html", INDEX_HTML),
            ("styles.css", STYLES_CSS),
            ("README.md", README_MD),
        ] {
            let mut tera = Tera::default();
            assert!(tera.add_raw_template(name, source).is_ok(), "{name} failed to parse");
        }
    }
}
