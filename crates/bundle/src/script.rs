//! `script.js` shipped with every bundle.

use crate::template::SCRIPT_JS;

/// Disables forms, opens external links in a new tab and smooth-scrolls
/// in-page anchors.
pub fn enhanced_script() -> &'static str {
    SCRIPT_JS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_covers_links_forms_and_anchors() {
        let js = enhanced_script();
        assert!(js.contains("Form submission is disabled"));
        assert!(js.contains(r#"a[href^="http"]"#));
        assert!(js.contains("'_blank'"));
        assert!(js.contains("scrollIntoView"));
    }
}
