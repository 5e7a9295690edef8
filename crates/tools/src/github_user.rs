//! Public GitHub profile lookup.

use async_trait::async_trait;
use clonekit_core::error::ToolError;
use clonekit_core::tool::{Tool, ToolInput, ToolKind};
use serde_json::{Map, Value};

const GITHUB_API: &str = "https://api.github.com";

const PROFILE_FIELDS: [&str; 10] = [
    "login",
    "id",
    "name",
    "location",
    "twitter_username",
    "public_repos",
    "public_gists",
    "user_view_type",
    "followers",
    "following",
];

pub struct GithubUserTool {
    client: reqwest::Client,
    api_base: String,
}

impl GithubUserTool {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_api_base(client, GITHUB_API)
    }

    pub fn with_api_base(client: reqwest::Client, api_base: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }
}

/// Keep only the profile fields worth showing the model.
fn project_profile(user: &Value) -> Value {
    let mut out = Map::new();
    for field in PROFILE_FIELDS {
        out.insert(field.to_string(), user.get(field).cloned().unwrap_or(Value::Null));
    }
    Value::Object(out)
}

#[async_trait]
impl Tool for GithubUserTool {
    fn kind(&self) -> ToolKind {
        ToolKind::GithubUser
    }

    async fn execute(&self, input: &ToolInput) -> Result<String, ToolError> {
        let username = input.single()?.trim().to_lowercase();
        if username.is_empty() {
            return Err(ToolError::InvalidArguments("username is empty".into()));
        }

        let url = format!("{}/users/{}", self.api_base, urlencoding::encode(&username));
        let user: Value = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ToolError::failed(self.kind().name(), e))?
            .json()
            .await
            .map_err(|e| ToolError::failed(self.kind().name(), e))?;

        Ok(project_profile(&user).to_string())
    }
}
