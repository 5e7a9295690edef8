//! Local filenames for remote assets.
//!
//! The HTML generator and the downloader must agree on every name, so both
//! call the functions here and nothing else. All of them are pure.

use std::path::Path;

use clonekit_core::snapshot::ImageRef;

const ALT_LIMIT: usize = 20;
const CLASS_LIMIT: usize = 15;

/// Filename for the image at `index` in the snapshot's image list.
///
/// The URL's own filename wins when it has an extension. Otherwise a name
/// is synthesized from the index, the alt text and the class list.
pub fn derive_image_filename(image: &ImageRef, index: usize) -> String {
    if let Some(name) = url_file_name(&image.src) {
        return name;
    }

    let mut name = format!("image_{index}");
    if !image.alt.trim().is_empty() {
        name.push('_');
        name.push_str(&sanitize(&image.alt, ALT_LIMIT));
    }
    if !image.class_name.is_empty() {
        name.push('_');
        name.push_str(&sanitize(&image.class_name, CLASS_LIMIT));
    }
    name.push_str(".jpg");
    name
}

/// Filename for the external stylesheet at `index`.
pub fn derive_stylesheet_filename(href: &str, index: usize) -> String {
    url_file_name(href).unwrap_or_else(|| format!("external_css_{index}_style.css"))
}

/// Filename for the external script at `index`.
pub fn derive_script_filename(src: &str, index: usize) -> String {
    url_file_name(src).unwrap_or_else(|| format!("external_js_{index}_script.js"))
}

/// Last path segment of `url` without query or fragment, if it looks like
/// a filename (contains a dot).
fn url_file_name(url: &str) -> Option<String> {
    let segment = url.rsplit('/').next()?;
    let segment = segment.split(['?', '#']).next().unwrap_or_default();
    if !segment.contains('.') {
        return None;
    }

    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    let name = decoded.replace(['/', '\\'], "_");

    if name.chars().all(|c| c == '.') {
        return None;
    }
    Some(name)
}

/// Replace every character outside `[A-Za-z0-9]` with `_` and keep at most
/// `limit` characters.
fn sanitize(text: &str, limit: usize) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .take(limit)
        .collect()
}

/// First free variant of `name`: `name`, then `stem_1.ext`, `stem_2.ext`, ...
///
/// `exists` reports whether a candidate is already taken.
pub fn dedup_filename(name: &str, exists: impl Fn(&str) -> bool) -> String {
    if !exists(name) {
        return name.to_string();
    }

    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (name, None),
    };

    let mut counter = 1usize;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{stem}_{counter}.{ext}"),
            None => format!("{stem}_{counter}"),
        };
        if !exists(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// First name derived from `name` that is not yet a file in `dir`.
pub fn reserve_filename(dir: &Path, name: &str) -> String {
    dedup_filename(name, |candidate| dir.join(candidate).exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn image(src: &str, alt: &str, class_name: &str) -> ImageRef {
        ImageRef {
            src: src.into(),
            alt: alt.into(),
            class_name: class_name.into(),
        }
    }

    #[test]
    fn url_name_with_extension_is_kept() {
        let img = image("https://cdn.example.com/img/logo.png?v=3", "Logo", "nav");
        assert_eq!(derive_image_filename(&img, 7), "logo.png");
    }

    #[test]
    fn extensionless_url_synthesizes_name() {
        let img = image("https://cdn.example.com/avatar", "", "");
        assert_eq!(derive_image_filename(&img, 1), "image_1.jpg");
    }

    #[test]
    fn alt_and_class_are_sanitized_and_truncated() {
        let img = image(
            "https://cdn.example.com/photo?id=9",
            "Piyush Garg's profile picture!",
            "rounded-full w-12 h-12",
        );
        assert_eq!(
            derive_image_filename(&img, 3),
            "image_3_Piyush_Garg_s_profil_rounded_full_w_.jpg"
        );
    }

    #[test]
    fn blank_alt_is_ignored_but_class_is_used() {
        let img = image("https://x/y", "   ", "hero");
        assert_eq!(derive_image_filename(&img, 0), "image_0_hero.jpg");
    }

    #[test]
    fn non_ascii_characters_become_underscores() {
        let img = image("https://x/y", "café", "");
        assert_eq!(derive_image_filename(&img, 2), "image_2_caf_.jpg");
    }

    #[test]
    fn derivation_is_deterministic() {
        let img = image("https://x/pic", "A b", "c");
        assert_eq!(derive_image_filename(&img, 4), derive_image_filename(&img, 4));
    }

    #[test]
    fn stylesheet_and_script_fallbacks() {
        assert_eq!(derive_stylesheet_filename("https://x/css?family=Inter", 2), "external_css_2_style.css");
        assert_eq!(derive_stylesheet_filename("https://x/site.min.css", 2), "site.min.css");
        assert_eq!(derive_script_filename("https://x/gtag/js?id=G-1", 0), "external_js_0_script.js");
        assert_eq!(derive_script_filename("https://x/_next/static/chunks/main-abc.js", 5), "main-abc.js");
    }

    #[test]
    fn percent_encoded_names_are_decoded() {
        let img = image("https://x/my%20photo.png", "", "");
        assert_eq!(derive_image_filename(&img, 0), "my photo.png");
    }

    #[test]
    fn encoded_separators_cannot_escape_assets_dir() {
        let img = image("https://x/..%2F..%2Fetc.png", "", "");
        assert_eq!(derive_image_filename(&img, 0), ".._.._etc.png");

        let dots = image("https://x/a/..", "", "");
        assert_eq!(derive_image_filename(&dots, 4), "image_4.jpg");
    }

    #[test]
    fn dedup_returns_name_when_free() {
        assert_eq!(dedup_filename("a.png", |_| false), "a.png");
    }

    #[test]
    fn dedup_appends_increasing_suffixes() {
        let taken: HashSet<&str> = ["a.png", "a_1.png", "a_2.png"].into_iter().collect();
        assert_eq!(dedup_filename("a.png", |n| taken.contains(n)), "a_3.png");
    }

    #[test]
    fn dedup_uses_last_dot_for_extension() {
        let taken: HashSet<&str> = ["site.min.css"].into_iter().collect();
        assert_eq!(dedup_filename("site.min.css", |n| taken.contains(n)), "site.min_1.css");
    }

    #[test]
    fn dedup_without_extension() {
        let taken: HashSet<&str> = ["LICENSE"].into_iter().collect();
        assert_eq!(dedup_filename("LICENSE", |n| taken.contains(n)), "LICENSE_1");
    }

    #[test]
    fn reserve_checks_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(reserve_filename(dir.path(), "a.png"), "a.png");
        std::fs::write(dir.path().join("a.png"), b"x").unwrap();
        assert_eq!(reserve_filename(dir.path(), "a.png"), "a_1.png");
    }
}
