//! Structural summary of an HTML document.

use async_trait::async_trait;
use clonekit_core::error::ToolError;
use clonekit_core::tool::{Tool, ToolInput, ToolKind};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlSummary {
    pub title: String,
    pub meta_tags: Vec<MetaSummary>,
    pub stylesheets: Vec<String>,
    pub scripts: Vec<String>,
    pub images: Vec<ImageSummary>,
    /// Direct children of `<body>`.
    pub structure: Vec<ElementSummary>,
}

#[derive(Debug, Serialize)]
pub struct MetaSummary {
    pub name: Option<String>,
    pub property: Option<String>,
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImageSummary {
    pub src: Option<String>,
    pub alt: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSummary {
    pub tag_name: String,
    pub classes: Option<String>,
    pub id: Option<String>,
}

fn selector(css: &str) -> Result<Selector, ToolError> {
    Selector::parse(css)
        .map_err(|e| ToolError::failed(ToolKind::ParseHtml.name(), format!("selector {css}: {e}")))
}

fn attr(element: &ElementRef<'_>, name: &str) -> Option<String> {
    element.value().attr(name).map(str::to_string)
}

/// Summarise `html` the way the parse tool reports it.
pub fn summarize_html(html: &str) -> Result<HtmlSummary, ToolError> {
    let document = Html::parse_document(html);
    let mut summary = HtmlSummary::default();

    if let Some(title) = document.select(&selector("title")?).next() {
        summary.title = title.text().collect::<String>().trim().to_string();
    }

    summary.meta_tags = document
        .select(&selector("meta")?)
        .map(|m| MetaSummary {
            name: attr(&m, "name"),
            property: attr(&m, "property"),
            content: attr(&m, "content"),
        })
        .collect();

    summary.stylesheets = document
        .select(&selector(r#"link[rel="stylesheet"]"#)?)
        .filter_map(|l| attr(&l, "href"))
        .collect();

    summary.scripts = document
        .select(&selector("script[src]")?)
        .filter_map(|s| attr(&s, "src"))
        .collect();

    summary.images = document
        .select(&selector("img")?)
        .map(|img| ImageSummary {
            src: attr(&img, "src"),
            alt: attr(&img, "alt"),
            width: attr(&img, "width"),
            height: attr(&img, "height"),
        })
        .collect();

    if let Some(body) = document.select(&selector("body")?).next() {
        summary.structure = body
            .children()
            .filter_map(ElementRef::wrap)
            .map(|el| ElementSummary {
                tag_name: el.value().name().to_string(),
                classes: attr(&el, "class"),
                id: attr(&el, "id"),
            })
            .collect();
    }

    Ok(summary)
}

#[derive(Debug, Default)]
pub struct HtmlParseTool;

#[async_trait]
impl Tool for HtmlParseTool {
    fn kind(&self) -> ToolKind {
        ToolKind::ParseHtml
    }

    async fn execute(&self, input: &ToolInput) -> Result<String, ToolError> {
        let summary = summarize_html(input.single()?)?;
        serde_json::to_string(&summary).map_err(|e| ToolError::failed(self.kind().name(), e))
    }
}
