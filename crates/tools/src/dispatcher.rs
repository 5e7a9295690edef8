//! Routes a model's TOOL command to the tool that implements it.
//!
//! Lookup goes through the closed [`ToolKind`] catalogue. Snapshot tools are
//! checked against the session before anything runs, so a missing analysis
//! never touches the filesystem.

use std::sync::Arc;

use chrono::Utc;
use clonekit_bundle::{
    AssetDownloader, AssetSource, BundleLayout, generate_css, generate_html, generate_readme,
    http_client,
};
use clonekit_config::AppConfig;
use clonekit_core::error::ToolError;
use clonekit_core::session::Session;
use clonekit_core::snapshot::{PageCapture, PageSnapshot};
use clonekit_core::tool::{Precondition, Tool, ToolInput, ToolKind};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::download_asset::DownloadAssetTool;
use crate::file_write::{CreateDirectoryTool, FileWriteTool};
use crate::github_user::GithubUserTool;
use crate::html_parse::HtmlParseTool;
use crate::observation::Observation;
use crate::shell::ShellTool;
use crate::weather_lookup::WeatherLookupTool;
use crate::web_fetch::WebFetchTool;

const INPUT_PREVIEW_CHARS: usize = 80;

/// A TOOL command that never reached a tool.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("{tool} needs a website analysis first. Run analyzeWebsiteWithPuppeteer before it.")]
    MissingSnapshot { tool: ToolKind },
}

/// Owns one instance of every tool plus the collaborators the snapshot
/// tools need.
pub struct Dispatcher {
    weather: WeatherLookupTool,
    github: GithubUserTool,
    shell: ShellTool,
    fetch: WebFetchTool,
    parse: HtmlParseTool,
    write_file: FileWriteTool,
    create_dir: CreateDirectoryTool,
    download: DownloadAssetTool,
    capture: Arc<dyn PageCapture>,
    downloader: AssetDownloader,
    layout: BundleLayout,
}

impl Dispatcher {
    /// Build with default tool settings.
    pub fn new(
        capture: Arc<dyn PageCapture>,
        assets: Arc<dyn AssetSource>,
        layout: BundleLayout,
    ) -> Self {
        Self::with_client(http_client(&AppConfig::default().tools.user_agent), capture, assets, layout)
    }

    /// Build with the bundle root from `config`. `client` serves every HTTP
    /// tool and is usually the one behind `assets` too.
    pub fn from_config(
        config: &AppConfig,
        client: reqwest::Client,
        capture: Arc<dyn PageCapture>,
        assets: Arc<dyn AssetSource>,
    ) -> Self {
        Self::with_client(
            client,
            capture,
            assets,
            BundleLayout::new(config.bundle.root.clone()),
        )
    }

    fn with_client(
        client: reqwest::Client,
        capture: Arc<dyn PageCapture>,
        assets: Arc<dyn AssetSource>,
        layout: BundleLayout,
    ) -> Self {
        Self {
            weather: WeatherLookupTool::new(client.clone()),
            github: GithubUserTool::new(client.clone()),
            shell: ShellTool,
            fetch: WebFetchTool::new(client),
            parse: HtmlParseTool,
            write_file: FileWriteTool,
            create_dir: CreateDirectoryTool,
            download: DownloadAssetTool::new(assets.clone()),
            capture,
            downloader: AssetDownloader::new(assets, layout.clone()),
            layout,
        }
    }

    pub fn layout(&self) -> &BundleLayout {
        &self.layout
    }

    /// Execute `tool_name` with the raw wire input.
    ///
    /// Returns `Err` only when no tool ran. A tool that ran and failed is an
    /// `Ok` observation carrying the error.
    pub async fn dispatch(
        &self,
        session: &mut Session,
        tool_name: &str,
        raw_input: &str,
    ) -> Result<Observation, DispatchError> {
        let kind = ToolKind::from_name(tool_name)
            .ok_or_else(|| DispatchError::UnknownTool(tool_name.to_string()))?;

        if kind.precondition() == Precondition::RequiresSnapshot && !session.has_snapshot() {
            return Err(DispatchError::MissingSnapshot { tool: kind });
        }

        let input = ToolInput::from_wire(kind.arity(), raw_input);
        info!(tool = %kind, input = %preview(raw_input), "Calling tool");

        let result = match kind {
            ToolKind::Weather => self.weather.execute(&input).await,
            ToolKind::GithubUser => self.github.execute(&input).await,
            ToolKind::ExecuteCommand => self.shell.execute(&input).await,
            ToolKind::FetchWebsite => self.fetch.execute(&input).await,
            ToolKind::ParseHtml => self.parse.execute(&input).await,
            ToolKind::WriteFile => self.write_file.execute(&input).await,
            ToolKind::CreateDirectory => self.create_dir.execute(&input).await,
            ToolKind::DownloadAsset => self.download.execute(&input).await,
            ToolKind::AnalyzeWebsite => self.analyze(session, &input).await,
            ToolKind::GenerateHtml => self.write_html(snapshot_of(session, kind)?).await,
            ToolKind::GenerateCss => self.write_css(snapshot_of(session, kind)?).await,
            ToolKind::DownloadAssets => self.download_assets(snapshot_of(session, kind)?).await,
            ToolKind::CreateReadme => self.write_readme(snapshot_of(session, kind)?).await,
        };

        match &result {
            Ok(text) => debug!(tool = %kind, chars = text.chars().count(), "Tool succeeded"),
            Err(e) => warn!(tool = %kind, error = %e, "Tool failed"),
        }
        Ok(Observation::new(kind, result))
    }

    async fn analyze(&self, session: &mut Session, input: &ToolInput) -> Result<String, ToolError> {
        let url = input.single()?.trim();
        if url.is_empty() {
            return Err(ToolError::InvalidArguments("url is empty".into()));
        }

        let snapshot = self.capture.capture(url).await?;
        let payload = serde_json::to_string(&snapshot)
            .map_err(|e| ToolError::failed(ToolKind::AnalyzeWebsite.name(), e))?;
        session.store_snapshot(snapshot);
        Ok(payload)
    }

    async fn write_html(&self, snapshot: &PageSnapshot) -> Result<String, ToolError> {
        let html = generate_html(snapshot)?;
        let path = self.layout.index_html();
        self.layout.write_file(&path, &html).await?;
        Ok(format!(
            "Generated {} ({} characters) with local asset references",
            path.display(),
            html.chars().count()
        ))
    }

    async fn write_css(&self, snapshot: &PageSnapshot) -> Result<String, ToolError> {
        let css = generate_css(snapshot);
        let path = self.layout.styles_css();
        self.layout.write_file(&path, &css).await?;
        Ok(format!("Generated {} ({} characters)", path.display(), css.chars().count()))
    }

    async fn download_assets(&self, snapshot: &PageSnapshot) -> Result<String, ToolError> {
        let report = self.downloader.download_all(snapshot).await?;
        Ok(report.summary())
    }

    async fn write_readme(&self, snapshot: &PageSnapshot) -> Result<String, ToolError> {
        let root = self.layout.root().display().to_string();
        let readme = generate_readme(snapshot, &root, Utc::now())?;
        let path = self.layout.readme();
        self.layout.write_file(&path, &readme).await?;
        Ok(format!("Created {}", path.display()))
    }
}

fn snapshot_of(session: &Session, tool: ToolKind) -> Result<&PageSnapshot, DispatchError> {
    session.snapshot().ok_or(DispatchError::MissingSnapshot { tool })
}

fn preview(input: &str) -> String {
    let mut out: String = input.chars().take(INPUT_PREVIEW_CHARS).collect();
    if input.chars().nth(INPUT_PREVIEW_CHARS).is_some() {
        out.push_str("...");
    }
    out
}
