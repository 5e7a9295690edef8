//! On-disk shape of a bundle.

use std::path::{Path, PathBuf};

use clonekit_core::error::BundleError;
use tracing::debug;

pub const ASSETS_DIR: &str = "assets";

/// Paths of every file a bundle consists of, relative to one root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleLayout {
    root: PathBuf,
}

impl BundleLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_html(&self) -> PathBuf {
        self.root.join("index.html")
    }

    pub fn styles_css(&self) -> PathBuf {
        self.root.join("styles.css")
    }

    pub fn script_js(&self) -> PathBuf {
        self.root.join("script.js")
    }

    pub fn readme(&self) -> PathBuf {
        self.root.join("README.md")
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join(ASSETS_DIR)
    }

    /// Create `path` if missing. Succeeds when it already exists.
    pub async fn ensure_dir(&self, path: &Path) -> Result<(), BundleError> {
        tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| write_error(path, e))
    }

    /// Write `contents` to `path`, creating parent directories first.
    pub async fn write_file(&self, path: &Path, contents: impl AsRef<[u8]>) -> Result<(), BundleError> {
        if let Some(parent) = path.parent() {
            self.ensure_dir(parent).await?;
        }
        let contents = contents.as_ref();
        tokio::fs::write(path, contents)
            .await
            .map_err(|e| write_error(path, e))?;
        debug!(path = %path.display(), bytes = contents.len(), "Wrote bundle file");
        Ok(())
    }
}

impl Default for BundleLayout {
    fn default() -> Self {
        Self::new("website-clone")
    }
}

fn write_error(path: &Path, err: std::io::Error) -> BundleError {
    BundleError::Write {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}
