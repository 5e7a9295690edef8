//! Downloading the assets a snapshot references.
//!
//! Images go first, then external stylesheets, then external scripts, each
//! in snapshot order. Downloads are sequential; a name is reserved against
//! the files already in `assets/` right before the file is written.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use clonekit_core::error::BundleError;
use clonekit_core::snapshot::PageSnapshot;
use tracing::{debug, info, warn};

use crate::layout::BundleLayout;
use crate::naming::{
    derive_image_filename, derive_script_filename, derive_stylesheet_filename, reserve_filename,
};
use crate::script::enhanced_script;

/// Fetches the bytes behind an asset URL.
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, BundleError>;
}

/// [`AssetSource`] over plain HTTP GET.
pub struct HttpAssetSource {
    client: reqwest::Client,
}

impl HttpAssetSource {
    pub fn new(user_agent: &str) -> Self {
        Self::with_client(http_client(user_agent))
    }

    /// Share a client built elsewhere, usually with [`http_client`].
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

/// The HTTP client every outbound fetch uses: browser-like user agent and
/// a 60 second timeout.
pub fn http_client(user_agent: &str) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[async_trait]
impl AssetSource for HttpAssetSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, BundleError> {
        let fetch_error = |reason: String| BundleError::Fetch {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!("HTTP {}", status.as_u16())));
        }

        let bytes = response.bytes().await.map_err(|e| fetch_error(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Image,
    Stylesheet,
    Script,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Image => "image",
            Self::Stylesheet => "stylesheet",
            Self::Script => "script",
        })
    }
}

/// An asset that the download pass will try to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAsset {
    pub kind: AssetKind,
    pub source_url: String,
    pub derived_filename: String,
}

/// Every remote asset of `snapshot`, in download order.
///
/// Indices fed to the name derivation are positions in the snapshot's
/// full lists, so they agree with what the HTML generator links to.
pub fn plan_assets(snapshot: &PageSnapshot) -> Vec<PlannedAsset> {
    let images = snapshot
        .images
        .iter()
        .enumerate()
        .filter(|(_, image)| image.is_remote())
        .map(|(i, image)| PlannedAsset {
            kind: AssetKind::Image,
            source_url: image.src.clone(),
            derived_filename: derive_image_filename(image, i),
        });

    let stylesheets = snapshot
        .stylesheets
        .external
        .iter()
        .enumerate()
        .filter(|(_, sheet)| sheet.href.starts_with("http"))
        .map(|(i, sheet)| PlannedAsset {
            kind: AssetKind::Stylesheet,
            source_url: sheet.href.clone(),
            derived_filename: derive_stylesheet_filename(&sheet.href, i),
        });

    let scripts = snapshot
        .scripts
        .external
        .iter()
        .enumerate()
        .filter(|(_, src)| src.starts_with("http"))
        .map(|(i, src)| PlannedAsset {
            kind: AssetKind::Script,
            source_url: src.clone(),
            derived_filename: derive_script_filename(src, i),
        });

    images.chain(stylesheets).chain(scripts).collect()
}

/// One asset written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub kind: AssetKind,
    pub source_url: String,
    pub derived_filename: String,
    /// Name actually written; differs from `derived_filename` after a collision.
    pub final_filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFailure {
    pub kind: AssetKind,
    pub source_url: String,
    pub reason: String,
}

/// Outcome of one download pass.
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    pub assets_dir: PathBuf,
    pub records: Vec<AssetRecord>,
    pub failures: Vec<AssetFailure>,
}

impl DownloadReport {
    pub fn summary(&self) -> String {
        let mut text = format!(
            "Successfully downloaded {} assets to {} and created script.js",
            self.records.len(),
            self.assets_dir.display()
        );
        if !self.failures.is_empty() {
            text.push_str(&format!(" ({} failed)", self.failures.len()));
        }
        text
    }
}

/// Writes a snapshot's assets and the bundle script.
pub struct AssetDownloader {
    source: Arc<dyn AssetSource>,
    layout: BundleLayout,
}

impl AssetDownloader {
    pub fn new(source: Arc<dyn AssetSource>, layout: BundleLayout) -> Self {
        Self { source, layout }
    }

    /// Fetch and write every planned asset, then `script.js`.
    ///
    /// A failed fetch or write of one asset is recorded and skipped. Only
    /// failing to create the assets directory or to write `script.js`
    /// fails the pass.
    pub async fn download_all(&self, snapshot: &PageSnapshot) -> Result<DownloadReport, BundleError> {
        let assets_dir = self.layout.assets_dir();
        self.layout.ensure_dir(&assets_dir).await?;

        let plan = plan_assets(snapshot);
        info!(planned = plan.len(), dir = %assets_dir.display(), "Downloading assets");

        let mut report = DownloadReport {
            assets_dir: assets_dir.clone(),
            ..DownloadReport::default()
        };

        for asset in plan {
            let bytes = match self.source.fetch(&asset.source_url).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(kind = %asset.kind, url = %asset.source_url, error = %e, "Asset download failed");
                    report.failures.push(AssetFailure {
                        kind: asset.kind,
                        source_url: asset.source_url,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let final_filename = reserve_filename(&assets_dir, &asset.derived_filename);
            if let Err(e) = self.layout.write_file(&assets_dir.join(&final_filename), &bytes).await {
                warn!(file = %final_filename, error = %e, "Asset write failed");
                report.failures.push(AssetFailure {
                    kind: asset.kind,
                    source_url: asset.source_url,
                    reason: e.to_string(),
                });
                continue;
            }

            debug!(kind = %asset.kind, file = %final_filename, bytes = bytes.len(), "Saved asset");
            report.records.push(AssetRecord {
                kind: asset.kind,
                source_url: asset.source_url,
                derived_filename: asset.derived_filename,
                final_filename,
            });
        }

        self.layout
            .write_file(&self.layout.script_js(), enhanced_script())
            .await?;

        info!(
            saved = report.records.len(),
            failed = report.failures.len(),
            "Asset download complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clonekit_core::snapshot::{ExternalStylesheet, ImageRef};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned bodies and remembers the order of requests.
    #[derive(Default)]
    struct MapSource {
        bodies: HashMap<String, Vec<u8>>,
        requested: Mutex<Vec<String>>,
    }

    impl MapSource {
        fn with(entries: &[(&str, &str)]) -> Self {
            Self {
                bodies: entries
                    .iter()
                    .map(|(url, body)| (url.to_string(), body.as_bytes().to_vec()))
                    .collect(),
                requested: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AssetSource for MapSource {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, BundleError> {
            self.requested.lock().unwrap().push(url.to_string());
            self.bodies.get(url).cloned().ok_or_else(|| BundleError::Fetch {
                url: url.to_string(),
                reason: "HTTP 404".into(),
            })
        }
    }

    fn image(src: &str) -> ImageRef {
        ImageRef {
            src: src.into(),
            ..ImageRef::default()
        }
    }

    fn sheet(href: &str) -> ExternalStylesheet {
        ExternalStylesheet {
            href: href.into(),
            ..ExternalStylesheet::default()
        }
    }

    /// Answers one HTTP request with `status` and `body`, and hands back the
    /// raw request it received.
    async fn one_shot_server(
        status: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<String>) {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.ends_with(b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&request).to_lowercase()
        });
        (base, handle)
    }

    #[tokio::test]
    async fn http_source_uses_the_shared_client() {
        let (base, server) = one_shot_server("200 OK", "PNGDATA").await;
        let source = HttpAssetSource::with_client(http_client("clonekit-test/1.0"));

        let bytes = source.fetch(&format!("{base}/logo.png")).await.unwrap();
        assert_eq!(bytes, b"PNGDATA");

        let request = server.await.unwrap();
        assert!(request.starts_with("get /logo.png"));
        assert!(request.contains("user-agent: clonekit-test/1.0"));
    }

    #[tokio::test]
    async fn http_source_reports_error_status() {
        let (base, server) = one_shot_server("404 Not Found", "").await;
        let source = HttpAssetSource::new("clonekit-test/1.0");

        let err = source.fetch(&format!("{base}/missing.png")).await.unwrap_err();
        assert!(matches!(err, BundleError::Fetch { ref reason, .. } if reason == "HTTP 404"));
        server.await.unwrap();
    }

    #[test]
    fn plan_orders_by_kind_and_skips_local_sources() {
        let mut snap = PageSnapshot::default();
        snap.images = vec![image("data:image/png;base64,AA"), image("https://x/a.png")];
        snap.stylesheets.external = vec![sheet("https://x/site.css")];
        snap.scripts.external = vec!["/local.js".into(), "https://x/gtag/js?id=1".into()];

        let plan = plan_assets(&snap);
        let names: Vec<_> = plan.iter().map(|p| (p.kind, p.derived_filename.as_str())).collect();
        assert_eq!(
            names,
            vec![
                (AssetKind::Image, "a.png"),
                (AssetKind::Stylesheet, "site.css"),
                (AssetKind::Script, "external_js_1_script.js"),
            ]
        );
    }

    #[tokio::test]
    async fn downloads_assets_and_writes_script() {
        let dir = tempfile::tempdir().unwrap();
        let layout = BundleLayout::new(dir.path().join("site"));
        let source = Arc::new(MapSource::with(&[
            ("https://x/a.png", "png"),
            ("https://x/b", "jpeg"),
            ("https://x/site.css", "body{}"),
        ]));

        let mut snap = PageSnapshot::default();
        snap.images = vec![image("https://x/a.png"), image("https://x/b")];
        snap.stylesheets.external = vec![sheet("https://x/site.css")];

        let downloader = AssetDownloader::new(source.clone(), layout.clone());
        let report = downloader.download_all(&snap).await.unwrap();

        assert_eq!(report.records.len(), 3);
        assert!(report.failures.is_empty());
        assert_eq!(std::fs::read(layout.assets_dir().join("a.png")).unwrap(), b"png");
        assert_eq!(std::fs::read(layout.assets_dir().join("image_1.jpg")).unwrap(), b"jpeg");
        assert!(layout.script_js().is_file());
        assert_eq!(
            *source.requested.lock().unwrap(),
            vec!["https://x/a.png", "https://x/b", "https://x/site.css"]
        );
        assert!(report.summary().starts_with("Successfully downloaded 3 assets"));
    }

    #[tokio::test]
    async fn colliding_names_get_increasing_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let layout = BundleLayout::new(dir.path());
        let source = Arc::new(MapSource::with(&[
            ("https://a.com/logo.png", "1"),
            ("https://b.com/logo.png", "2"),
            ("https://c.com/logo.png", "3"),
        ]));

        let mut snap = PageSnapshot::default();
        snap.images = vec![
            image("https://a.com/logo.png"),
            image("https://b.com/logo.png"),
            image("https://c.com/logo.png"),
        ];

        let report = AssetDownloader::new(source, layout.clone())
            .download_all(&snap)
            .await
            .unwrap();

        let finals: Vec<_> = report.records.iter().map(|r| r.final_filename.as_str()).collect();
        assert_eq!(finals, vec!["logo.png", "logo_1.png", "logo_2.png"]);
        assert!(report.records.iter().all(|r| r.derived_filename == "logo.png"));
        assert_eq!(std::fs::read(layout.assets_dir().join("logo.png")).unwrap(), b"1");
        assert_eq!(std::fs::read(layout.assets_dir().join("logo_2.png")).unwrap(), b"3");
    }

    #[tokio::test]
    async fn failed_fetch_is_recorded_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let layout = BundleLayout::new(dir.path());
        let source = Arc::new(MapSource::with(&[("https://x/ok.png", "ok")]));

        let mut snap = PageSnapshot::default();
        snap.images = vec![image("https://x/missing.png"), image("https://x/ok.png")];

        let report = AssetDownloader::new(source, layout.clone())
            .download_all(&snap)
            .await
            .unwrap();

        assert_eq!(report.records.len(), 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].source_url, "https://x/missing.png");
        assert!(!layout.assets_dir().join("missing.png").exists());
        assert!(report.summary().contains("(1 failed)"));
    }

    #[tokio::test]
    async fn empty_snapshot_still_creates_assets_dir_and_script() {
        let dir = tempfile::tempdir().unwrap();
        let layout = BundleLayout::new(dir.path().join("out"));
        let report = AssetDownloader::new(Arc::new(MapSource::default()), layout.clone())
            .download_all(&PageSnapshot::default())
            .await
            .unwrap();

        assert!(report.records.is_empty());
        assert!(layout.assets_dir().is_dir());
        assert_eq!(std::fs::read_to_string(layout.script_js()).unwrap(), enhanced_script());
    }
}
