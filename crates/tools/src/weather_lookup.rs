//! Weather lookup via wttr.in.

use async_trait::async_trait;
use clonekit_core::error::ToolError;
use clonekit_core::tool::{Tool, ToolInput, ToolKind};
use tracing::debug;

const WTTR_BASE: &str = "https://wttr.in";

/// One-line current conditions for a city.
pub struct WeatherLookupTool {
    client: reqwest::Client,
    base_url: String,
}

impl WeatherLookupTool {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, WTTR_BASE)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url_for(&self, city: &str) -> String {
        let city = urlencoding::encode(&city.trim().to_lowercase()).into_owned();
        format!("{}/{city}?format=%C+%t", self.base_url)
    }
}

#[async_trait]
impl Tool for WeatherLookupTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Weather
    }

    async fn execute(&self, input: &ToolInput) -> Result<String, ToolError> {
        let city = input.single()?;
        if city.trim().is_empty() {
            return Err(ToolError::InvalidArguments("city name is empty".into()));
        }

        let url = self.url_for(city);
        debug!(%url, "Looking up weather");

        let body = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ToolError::failed(self.kind().name(), e))?
            .text()
            .await
            .map_err(|e| ToolError::failed(self.kind().name(), e))?;

        Ok(format!("The current weather of {} is {}", city.trim(), body.trim()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_is_lowercased_and_encoded() {
        let tool = WeatherLookupTool::new(reqwest::Client::new());
        assert_eq!(tool.url_for("New Delhi"), "https://wttr.in/new%20delhi?format=%C+%t");
    }

    #[tokio::test]
    async fn empty_city_is_rejected() {
        let tool = WeatherLookupTool::new(reqwest::Client::new());
        let err = tool.execute(&ToolInput::Single("  ".into())).await.unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }
}
