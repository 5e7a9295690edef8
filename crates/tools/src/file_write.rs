//! Filesystem tools: whole-file writes and directory creation.

use std::path::Path;

use async_trait::async_trait;
use clonekit_core::error::ToolError;
use clonekit_core::tool::{Tool, ToolInput, ToolKind};
use tracing::debug;

/// Writes text to a path, creating parent directories first.
#[derive(Debug, Default)]
pub struct FileWriteTool;

#[async_trait]
impl Tool for FileWriteTool {
    fn kind(&self) -> ToolKind {
        ToolKind::WriteFile
    }

    async fn execute(&self, input: &ToolInput) -> Result<String, ToolError> {
        let (path, content) = input.pair()?;
        if path.is_empty() {
            return Err(ToolError::InvalidArguments("file path is empty".into()));
        }

        let path = Path::new(path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, content).await?;

        debug!(path = %path.display(), bytes = content.len(), "Wrote file");
        Ok(format!(
            "File {} created successfully ({} characters)",
            path.display(),
            content.chars().count()
        ))
    }
}

/// Creates a directory and its parents; an existing directory is fine.
#[derive(Debug, Default)]
pub struct CreateDirectoryTool;

#[async_trait]
impl Tool for CreateDirectoryTool {
    fn kind(&self) -> ToolKind {
        ToolKind::CreateDirectory
    }

    async fn execute(&self, input: &ToolInput) -> Result<String, ToolError> {
        let dir = input.single()?.trim();
        if dir.is_empty() {
            return Err(ToolError::InvalidArguments("directory path is empty".into()));
        }

        let path = Path::new(dir);
        if tokio::fs::try_exists(path).await? {
            return Ok(format!("Directory {dir} already exists"));
        }
        tokio::fs::create_dir_all(path).await?;
        Ok(format!("Directory {dir} created successfully"))
    }
}
