use std::future::Future;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, warn};

use crate::browser::ScanBrowser;
use crate::config::{ScannerBuilder, ScannerConfig};
use crate::error::Result;
use crate::page::Page;

/// Upper bound on image references reported per page.
pub const MAX_IMAGES: usize = 20;

/// An `<img>` found on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub src: String,
    pub alt: String,
}

impl ImageRef {
    /// Build a reference from raw DOM reads. Images without a source are skipped;
    /// a missing alt becomes the empty string.
    pub fn from_parts(src: Option<String>, alt: Option<String>) -> Option<Self> {
        let src = src.filter(|s| !s.is_empty())?;
        Some(Self {
            src,
            alt: alt.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Performance {
    /// Milliseconds from navigation start until the page was considered ready.
    /// Absent when the scan failed before that point.
    #[serde(rename = "loadTime", skip_serializing_if = "Option::is_none")]
    pub load_time: Option<u64>,
}

/// Everything reported about one page. Field order is the JSON key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    pub title: String,
    pub description: String,
    pub h1: String,
    pub images: Vec<ImageRef>,
    pub performance: Performance,
    /// Reserved for console messages. Capture is not implemented, so this is
    /// always empty.
    pub console_errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Runs a single-page scan in a fresh browser session.
pub struct Scanner {
    config: ScannerConfig,
}

impl Scanner {
    /// Create a new ScannerBuilder for configuring a scanner.
    pub fn builder() -> ScannerBuilder {
        ScannerBuilder::new()
    }

    pub fn new(config: ScannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Scan `url`. Failures never escape: they land in `error`, next to
    /// whatever was collected before the failure. The browser is closed on
    /// every path once it has launched.
    pub async fn scan(&self, url: &str) -> ScanResult {
        let mut result = ScanResult::default();

        let browser = match ScanBrowser::launch(&self.config).await {
            Ok(browser) => browser,
            Err(e) => {
                warn!(error = %e, "could not start browser");
                result.error = Some(e.to_string());
                return result;
            }
        };

        if let Err(e) = self.collect(&browser, url, &mut result).await {
            warn!(error = %e, url, "scan failed");
            result.error = Some(e.to_string());
        }

        if let Err(e) = browser.close().await {
            warn!(error = %e, "browser teardown failed");
        }

        result
    }

    async fn collect(&self, browser: &ScanBrowser, url: &str, result: &mut ScanResult) -> Result<()> {
        let page = browser.new_page().await?;

        let started = Instant::now();
        page.goto(url).await?;
        page.wait_until_ready(self.config.ready_condition()).await?;
        let load_time = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        result.performance.load_time = Some(load_time);
        debug!(url, load_time, "page ready");

        result.title = page.title().await?;

        if let Some(description) = best_effort("description", meta_description(&page)).await {
            result.description = description;
        }
        if let Some(h1) = best_effort("h1", first_heading(&page)).await {
            result.h1 = h1;
        }

        images(&page, &mut result.images).await?;
        debug!(count = result.images.len(), "images collected");

        Ok(())
    }
}

/// Element-level lookups never fail the scan: an error reads as "absent".
async fn best_effort<F>(field: &str, lookup: F) -> Option<String>
where
    F: Future<Output = Result<Option<String>>>,
{
    match lookup.await {
        Ok(value) => value,
        Err(e) => {
            debug!(field, error = %e, "lookup failed, leaving field empty");
            None
        }
    }
}

async fn meta_description(page: &Page) -> Result<Option<String>> {
    match page.query("meta[name='description']").await? {
        Some(meta) => meta.attribute("content").await,
        None => Ok(None),
    }
}

async fn first_heading(page: &Page) -> Result<Option<String>> {
    match page.query("h1").await? {
        Some(h1) => h1.inner_text().await,
        None => Ok(None),
    }
}

async fn images(page: &Page, out: &mut Vec<ImageRef>) -> Result<()> {
    let elements = page.query_all("img").await?;
    append_images(elements, out, |img| async move {
        let src = img.string_property("src").await?;
        let alt = img.attribute("alt").await?;
        Ok((src, alt))
    })
    .await
}

/// Reads `(src, alt)` from the first `MAX_IMAGES` elements, appending to `out`
/// as it goes so a failed read keeps the images before it.
async fn append_images<T, F, Fut>(elements: Vec<T>, out: &mut Vec<ImageRef>, mut read: F) -> Result<()>
where
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<(Option<String>, Option<String>)>>,
{
    for element in elements.into_iter().take(MAX_IMAGES) {
        let (src, alt) = read(element).await?;
        out.extend(ImageRef::from_parts(src, alt));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_result_shape() {
        let value = serde_json::to_value(ScanResult::default()).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "",
                "description": "",
                "h1": "",
                "images": [],
                "performance": {},
                "console_errors": []
            })
        );
    }

    #[test]
    fn error_and_load_time_serialize_when_set() {
        let result = ScanResult {
            title: "Example Domain".into(),
            images: vec![ImageRef {
                src: "https://example.com/a.png".into(),
                alt: "a".into(),
            }],
            performance: Performance {
                load_time: Some(3012),
            },
            error: Some("Navigation failed: timeout".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["performance"]["loadTime"], json!(3012));
        assert_eq!(value["error"], json!("Navigation failed: timeout"));
        assert_eq!(value["images"][0], json!({"src": "https://example.com/a.png", "alt": "a"}));
    }

    #[test]
    fn keys_keep_declaration_order() {
        let text = serde_json::to_string(&ScanResult {
            error: Some("x".into()),
            ..Default::default()
        })
        .unwrap();
        let order = ["\"title\"", "\"description\"", "\"h1\"", "\"images\"", "\"performance\"", "\"console_errors\"", "\"error\""];
        let positions: Vec<usize> = order.iter().map(|k| text.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{text}");
    }

    #[test]
    fn images_without_src_are_skipped() {
        assert_eq!(ImageRef::from_parts(None, Some("logo".into())), None);
        assert_eq!(ImageRef::from_parts(Some(String::new()), None), None);
    }

    #[test]
    fn missing_alt_defaults_to_empty() {
        let img = ImageRef::from_parts(Some("https://example.com/x.png".into()), None).unwrap();
        assert_eq!(img.alt, "");
        assert_eq!(img.src, "https://example.com/x.png");
    }

    fn image(n: usize) -> Result<(Option<String>, Option<String>)> {
        Ok((Some(format!("https://example.com/{n}.png")), Some(n.to_string())))
    }

    #[tokio::test]
    async fn failed_image_read_keeps_earlier_images() {
        let reads = vec![
            image(0),
            image(1),
            Err(crate::error::Error::JsError("node detached".into())),
            image(3),
        ];
        let mut out = Vec::new();
        let outcome = append_images(reads, &mut out, |read| async move { read }).await;

        assert!(outcome.is_err());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].src, "https://example.com/0.png");
        assert_eq!(out[1].alt, "1");
    }

    #[tokio::test]
    async fn image_reads_stop_at_the_limit() {
        let reads: Vec<_> = (0..30).map(image).collect();
        let mut out = Vec::new();
        append_images(reads, &mut out, |read| async move { read }).await.unwrap();

        assert_eq!(out.len(), MAX_IMAGES);
        assert_eq!(out.last().unwrap().alt, "19");
    }

    #[tokio::test]
    async fn sourceless_images_do_not_count_as_failures() {
        let reads = vec![image(0), Ok((None, Some("spacer".into()))), image(2)];
        let mut out = Vec::new();
        append_images(reads, &mut out, |read| async move { read }).await.unwrap();

        let alts: Vec<&str> = out.iter().map(|i| i.alt.as_str()).collect();
        assert_eq!(alts, ["0", "2"]);
    }

    #[tokio::test]
    async fn best_effort_swallows_errors() {
        let failing = async { Err(crate::error::Error::JsError("detached".into())) };
        assert_eq!(best_effort("h1", failing).await, None);

        let found = async { Ok(Some("Hello".to_string())) };
        assert_eq!(best_effort("h1", found).await.as_deref(), Some("Hello"));
    }
}
