//! Single-file download.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use clonekit_bundle::AssetSource;
use clonekit_core::error::ToolError;
use clonekit_core::tool::{Tool, ToolInput, ToolKind};

/// Fetches one URL and writes the bytes to the given path.
pub struct DownloadAssetTool {
    source: Arc<dyn AssetSource>,
}

impl DownloadAssetTool {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for DownloadAssetTool {
    fn kind(&self) -> ToolKind {
        ToolKind::DownloadAsset
    }

    async fn execute(&self, input: &ToolInput) -> Result<String, ToolError> {
        let (url, output) = input.pair()?;
        if url.is_empty() || output.is_empty() {
            return Err(ToolError::InvalidArguments(
                "expected an asset URL and an output path".into(),
            ));
        }

        let bytes = self.source.fetch(url).await?;

        let path = Path::new(output);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &bytes).await?;

        Ok(format!("Downloaded {url} to {output}"))
    }
}
