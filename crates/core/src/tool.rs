//! The tool catalogue.
//!
//! The set of tools the model may call is closed: [`ToolKind`] lists every
//! one of them together with its wire name, arity and precondition. Lookup
//! of a name the model made up yields `None`, never a panic.
//!
//! Tools that act on plain input implement [`Tool`]. Tools that act on the
//! cached page snapshot are driven directly by the dispatcher.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ToolError;

/// Every tool the agent can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    #[serde(rename = "getWeatherDetailsByCity")]
    Weather,
    #[serde(rename = "getGithubUserInfoByUsername")]
    GithubUser,
    #[serde(rename = "executeCommand")]
    ExecuteCommand,
    #[serde(rename = "analyzeWebsiteWithPuppeteer")]
    AnalyzeWebsite,
    #[serde(rename = "fetchWebsiteContent")]
    FetchWebsite,
    #[serde(rename = "parseHTMLWithCheerio")]
    ParseHtml,
    #[serde(rename = "writeFile")]
    WriteFile,
    #[serde(rename = "createDirectory")]
    CreateDirectory,
    #[serde(rename = "downloadAsset")]
    DownloadAsset,
    #[serde(rename = "generateCompleteHTML")]
    GenerateHtml,
    #[serde(rename = "generateCompleteCSS")]
    GenerateCss,
    #[serde(rename = "extractAndDownloadAssets")]
    DownloadAssets,
    #[serde(rename = "createProjectREADME")]
    CreateReadme,
}

/// How many arguments a tool takes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    One,
    Two,
}

/// What must hold before a tool may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    None,
    RequiresSnapshot,
}

impl ToolKind {
    pub const ALL: [ToolKind; 13] = [
        Self::Weather,
        Self::GithubUser,
        Self::ExecuteCommand,
        Self::AnalyzeWebsite,
        Self::FetchWebsite,
        Self::ParseHtml,
        Self::WriteFile,
        Self::CreateDirectory,
        Self::DownloadAsset,
        Self::GenerateHtml,
        Self::GenerateCss,
        Self::DownloadAssets,
        Self::CreateReadme,
    ];

    /// Resolve a model-supplied tool name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name.trim())
    }

    /// The name the model uses for this tool.
    pub fn name(self) -> &'static str {
        match self {
            Self::Weather => "getWeatherDetailsByCity",
            Self::GithubUser => "getGithubUserInfoByUsername",
            Self::ExecuteCommand => "executeCommand",
            Self::AnalyzeWebsite => "analyzeWebsiteWithPuppeteer",
            Self::FetchWebsite => "fetchWebsiteContent",
            Self::ParseHtml => "parseHTMLWithCheerio",
            Self::WriteFile => "writeFile",
            Self::CreateDirectory => "createDirectory",
            Self::DownloadAsset => "downloadAsset",
            Self::GenerateHtml => "generateCompleteHTML",
            Self::GenerateCss => "generateCompleteCSS",
            Self::DownloadAssets => "extractAndDownloadAssets",
            Self::CreateReadme => "createProjectREADME",
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            Self::WriteFile | Self::DownloadAsset => Arity::Two,
            _ => Arity::One,
        }
    }

    pub fn precondition(self) -> Precondition {
        match self {
            Self::GenerateHtml | Self::GenerateCss | Self::DownloadAssets | Self::CreateReadme => {
                Precondition::RequiresSnapshot
            }
            _ => Precondition::None,
        }
    }

    /// Call signature shown to the model.
    pub fn signature(self) -> &'static str {
        match self {
            Self::Weather => "getWeatherDetailsByCity(cityname)",
            Self::GithubUser => "getGithubUserInfoByUsername(username)",
            Self::ExecuteCommand => "executeCommand(command)",
            Self::AnalyzeWebsite => "analyzeWebsiteWithPuppeteer(url)",
            Self::FetchWebsite => "fetchWebsiteContent(url)",
            Self::ParseHtml => "parseHTMLWithCheerio(html)",
            Self::WriteFile => "writeFile(filepath, content)",
            Self::CreateDirectory => "createDirectory(path)",
            Self::DownloadAsset => "downloadAsset(assetUrl, outputPath)",
            Self::GenerateHtml => "generateCompleteHTML(analysisData)",
            Self::GenerateCss => "generateCompleteCSS(analysisData)",
            Self::DownloadAssets => "extractAndDownloadAssets(analysisData)",
            Self::CreateReadme => "createProjectREADME(analysisData)",
        }
    }

    /// One-line description used in the system prompt.
    pub fn description(self) -> &'static str {
        match self {
            Self::Weather => "Get the current weather for a city",
            Self::GithubUser => "Get public profile information for a GitHub user",
            Self::ExecuteCommand => "Execute a shell command and return its output",
            Self::AnalyzeWebsite => {
                "Render a page in a headless browser and capture its HTML, stylesheets, scripts and images"
            }
            Self::FetchWebsite => "Fetch the raw HTML of a URL without running scripts",
            Self::ParseHtml => "Summarise the structure of an HTML string",
            Self::WriteFile => "Write content to a file, creating parent directories",
            Self::CreateDirectory => "Create a directory (no error if it exists)",
            Self::DownloadAsset => "Download a single file to a local path",
            Self::GenerateHtml => {
                "Write index.html for the analysed page with local asset references and Tailwind setup"
            }
            Self::GenerateCss => "Write styles.css with base styles and Tailwind-friendly components",
            Self::DownloadAssets => {
                "Download every image, stylesheet and script of the analysed page and write script.js"
            }
            Self::CreateReadme => "Write README.md describing the generated clone",
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Structured tool input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolInput {
    Single(String),
    Pair { first: String, second: String },
}

impl ToolInput {
    /// Decode the single wire string according to the tool's arity.
    ///
    /// Two-argument tools split on the first comma only, so the second
    /// argument may itself contain commas. A missing comma leaves the
    /// second argument empty.
    pub fn from_wire(arity: Arity, raw: &str) -> Self {
        match arity {
            Arity::One => Self::Single(raw.to_string()),
            Arity::Two => match raw.split_once(',') {
                Some((first, second)) => Self::Pair {
                    first: first.trim().to_string(),
                    second: second.trim().to_string(),
                },
                None => Self::Pair {
                    first: raw.trim().to_string(),
                    second: String::new(),
                },
            },
        }
    }

    /// The sole argument of a one-argument tool.
    pub fn single(&self) -> Result<&str, ToolError> {
        match self {
            Self::Single(value) => Ok(value),
            Self::Pair { .. } => Err(ToolError::InvalidArguments(
                "expected a single argument".into(),
            )),
        }
    }

    /// Both arguments of a two-argument tool.
    pub fn pair(&self) -> Result<(&str, &str), ToolError> {
        match self {
            Self::Pair { first, second } => Ok((first, second)),
            Self::Single(_) => Err(ToolError::InvalidArguments(
                "expected two comma-separated arguments".into(),
            )),
        }
    }
}

/// A tool that acts on its input alone.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Which catalogue entry this tool implements.
    fn kind(&self) -> ToolKind;

    /// Execute the tool. The text returned becomes the observation.
    async fn execute(&self, input: &ToolInput) -> std::result::Result<String, ToolError>;
}
