//! Raw page fetch without running scripts.

use async_trait::async_trait;
use clonekit_core::error::ToolError;
use clonekit_core::tool::{Tool, ToolInput, ToolKind};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FetchedPage {
    status: u16,
    html: String,
    content_type: Option<String>,
    size: usize,
}

/// GETs a URL and reports status, content type and body as JSON.
pub struct WebFetchTool {
    client: reqwest::Client,
}

impl WebFetchTool {
    /// `client` should carry a browser user agent; some sites refuse others.
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WebFetchTool {
    fn kind(&self) -> ToolKind {
        ToolKind::FetchWebsite
    }

    async fn execute(&self, input: &ToolInput) -> Result<String, ToolError> {
        let url = input.single()?.trim();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ToolError::InvalidArguments(
                "URL must start with http:// or https://".into(),
            ));
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ToolError::failed(self.kind().name(), e))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let html = response
            .text()
            .await
            .map_err(|e| ToolError::failed(self.kind().name(), e))?;

        debug!(url, status, bytes = html.len(), "Fetched page");
        let page = FetchedPage {
            status,
            size: html.chars().count(),
            html,
            content_type,
        };
        serde_json::to_string(&page).map_err(|e| ToolError::failed(self.kind().name(), e))
    }
}
