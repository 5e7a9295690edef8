//! [`PageCapture`] backed by a local headless Chrome.
//!
//! The DevTools client is synchronous, so every capture runs on the
//! blocking thread pool. The browser process belongs to a single capture
//! and is shut down when that capture returns, whether it succeeded or not.

use std::time::Duration;

use async_trait::async_trait;
use clonekit_config::CaptureConfig;
use clonekit_core::error::CaptureError;
use clonekit_core::snapshot::{ImageRef, PageCapture, PageSnapshot, Scripts, Stylesheets};
use headless_chrome::{Browser, LaunchOptions};
use serde::Deserialize;
use tracing::{debug, info};

/// Runs inside the page after navigation. Stylesheet bodies are fetched from
/// the page's own origin so the browser's cookies and CORS rules apply.
const CAPTURE_SCRIPT: &str = r#"
(async () => {
  const external = [];
  for (const link of document.querySelectorAll('link[rel="stylesheet"]')) {
    try {
      const response = await fetch(link.href);
      external.push({ href: link.href, content: await response.text() });
    } catch (e) {
      external.push({ href: link.href, content: null, error: String(e && e.message || e) });
    }
  }
  const scripts = Array.from(document.querySelectorAll('script'));
  return JSON.stringify({
    url: location.href,
    title: document.title,
    bodyContent: document.body ? document.body.innerHTML : '',
    stylesheets: {
      external,
      inline: Array.from(document.querySelectorAll('style')).map(s => s.innerHTML),
    },
    scripts: {
      external: scripts.filter(s => s.src).map(s => s.src),
      inline: scripts.filter(s => !s.src).map(s => s.innerHTML),
    },
    images: Array.from(document.querySelectorAll('img')).map(img => ({
      src: img.src,
      alt: img.alt,
      className: typeof img.className === 'string' ? img.className : '',
    })),
  });
})()
"#;

/// Browser settings for one capture.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub headless: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub navigation_timeout: Duration,
    pub settle_delay: Duration,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self::from(&CaptureConfig::default())
    }
}

impl From<&CaptureConfig> for CaptureSettings {
    fn from(config: &CaptureConfig) -> Self {
        Self {
            headless: config.headless,
            window_width: config.window_width,
            window_height: config.window_height,
            navigation_timeout: Duration::from_secs(config.navigation_timeout_secs),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
        }
    }
}

/// Captures pages with a freshly launched Chrome per call.
#[derive(Debug, Clone, Default)]
pub struct ChromeCapture {
    settings: CaptureSettings,
}

impl ChromeCapture {
    pub fn new(settings: CaptureSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl PageCapture for ChromeCapture {
    async fn capture(&self, url: &str) -> Result<PageSnapshot, CaptureError> {
        info!(url, "Analyzing website");
        let settings = self.settings.clone();
        let target = url.to_string();

        let snapshot = tokio::task::spawn_blocking(move || capture_blocking(&settings, &target))
            .await
            .map_err(|e| CaptureError::Launch(format!("capture task failed: {e}")))??;

        info!(url, summary = %snapshot.summary(), "Analysis complete");
        Ok(snapshot)
    }
}

fn capture_blocking(settings: &CaptureSettings, url: &str) -> Result<PageSnapshot, CaptureError> {
    let options = LaunchOptions::default_builder()
        .headless(settings.headless)
        .sandbox(false)
        .window_size(Some((settings.window_width, settings.window_height)))
        .build()
        .map_err(|e| CaptureError::Launch(e.to_string()))?;

    let browser = Browser::new(options).map_err(|e| CaptureError::Launch(e.to_string()))?;
    let tab = browser
        .new_tab()
        .map_err(|e| CaptureError::Launch(format!("failed to open tab: {e}")))?;
    tab.set_default_timeout(settings.navigation_timeout);

    let navigation = |e: &dyn std::fmt::Display| CaptureError::Navigation {
        url: url.to_string(),
        reason: e.to_string(),
    };
    tab.navigate_to(url).map_err(|e| navigation(&e))?;
    tab.wait_until_navigated().map_err(|e| navigation(&e))?;

    debug!(delay_ms = settings.settle_delay.as_millis() as u64, "Waiting for page to settle");
    std::thread::sleep(settings.settle_delay);

    let raw_markup = tab
        .get_content()
        .map_err(|e| CaptureError::Script(format!("failed to read document: {e}")))?;

    let result = tab
        .evaluate(CAPTURE_SCRIPT, true)
        .map_err(|e| CaptureError::Script(e.to_string()))?;

    let payload = result
        .value
        .as_ref()
        .and_then(|v| v.as_str())
        .ok_or_else(|| CaptureError::Decode("page script returned no data".into()))?;

    decode_capture(url, raw_markup, payload)
}

/// Shape of the JSON produced by [`CAPTURE_SCRIPT`].
#[derive(Debug, Deserialize)]
struct CapturedPage {
    /// `location.href` once navigation settled, after any redirects.
    #[serde(default)]
    url: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "bodyContent", default)]
    body_content: String,
    #[serde(default)]
    stylesheets: Stylesheets,
    #[serde(default)]
    scripts: Scripts,
    #[serde(default)]
    images: Vec<ImageRef>,
}

/// Combine the document markup with the in-page capture payload.
///
/// The snapshot's url is where the page ended up; `requested` is only used
/// when the payload does not say.
pub fn decode_capture(requested: &str, raw_markup: String, payload: &str) -> Result<PageSnapshot, CaptureError> {
    let page: CapturedPage =
        serde_json::from_str(payload).map_err(|e| CaptureError::Decode(e.to_string()))?;

    let url = if page.url.is_empty() {
        requested.to_string()
    } else {
        if page.url != requested {
            debug!(requested, landed = %page.url, "Navigation was redirected");
        }
        page.url
    };

    Ok(PageSnapshot {
        raw_markup,
        post_script_markup: page.body_content,
        stylesheets: page.stylesheets,
        scripts: page.scripts,
        images: page.images,
        title: page.title,
        url,
    })
}
