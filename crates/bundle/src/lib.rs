//! Static site bundles from page snapshots.
//!
//! A bundle is a directory holding `index.html`, `styles.css`, `script.js`,
//! `README.md` and an `assets/` folder with every remote image, stylesheet
//! and script the page referenced. The HTML generator and the downloader
//! share [`naming`], so links in `index.html` always point at the files the
//! downloader writes.

pub mod assets;
pub mod css;
pub mod html;
pub mod layout;
pub mod naming;
pub mod readme;
pub mod script;
mod template;

pub use assets::{
    AssetDownloader, AssetRecord, AssetSource, DownloadReport, HttpAssetSource, http_client,
};
pub use css::generate_css;
pub use html::generate_html;
pub use layout::BundleLayout;
pub use readme::generate_readme;
pub use script::enhanced_script;
