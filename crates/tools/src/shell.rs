//! Shell tool: run a command through the platform shell.

use async_trait::async_trait;
use clonekit_core::error::ToolError;
use clonekit_core::tool::{Tool, ToolInput, ToolKind};
use tokio::process::Command;
use tracing::{debug, warn};

/// Runs one command line and returns its stdout.
///
/// A command that starts but exits unsuccessfully is reported as text, not
/// as an error, so the model sees what went wrong.
#[derive(Debug, Default)]
pub struct ShellTool;

#[async_trait]
impl Tool for ShellTool {
    fn kind(&self) -> ToolKind {
        ToolKind::ExecuteCommand
    }

    async fn execute(&self, input: &ToolInput) -> Result<String, ToolError> {
        let command = input.single()?;
        if command.trim().is_empty() {
            return Err(ToolError::InvalidArguments("command is empty".into()));
        }

        debug!(command = %command, "Executing shell command");

        let output = if cfg!(target_os = "windows") {
            Command::new("cmd").args(["/C", command]).output().await
        } else {
            Command::new("sh").args(["-c", command]).output().await
        }
        .map_err(|e| ToolError::failed(self.kind().name(), e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if output.status.success() {
            return Ok(stdout);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        warn!(command = %command, exit_code = ?output.status.code(), "Command failed");
        Ok(format!(
            "Error running command {command}: {}\n{}",
            output.status,
            stderr.trim()
        ))
    }
}
