use std::time::Duration;

use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::page::Page as CrPage;
use tracing::debug;

use crate::config::ReadyCondition;
use crate::element::Element;
use crate::error::{Error, Result};

/// Wrapper around a chromiumoxide Page with the scan-oriented API.
pub struct Page {
    inner: CrPage,
}

impl Page {
    pub(crate) fn new(inner: CrPage) -> Self {
        Self { inner }
    }

    /// Returns a reference to the underlying chromiumoxide Page.
    pub fn inner(&self) -> &CrPage {
        &self.inner
    }

    // ── Navigation ──────────────────────────────────────────────────

    /// Navigate to the given URL and wait for the load event.
    /// Network failures reported by Chrome (e.g. `net::ERR_CONNECTION_REFUSED`) are errors.
    pub async fn goto(&self, url: &str) -> Result<()> {
        self.inner
            .goto(url)
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?;
        Ok(())
    }

    /// Block until the page satisfies `condition`.
    pub async fn wait_until_ready(&self, condition: ReadyCondition) -> Result<()> {
        match condition {
            ReadyCondition::Fixed(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            ReadyCondition::DomQuiet { quiet, timeout } => {
                let settled = self.wait_for_dom_quiet(quiet, timeout).await?;
                debug!(settled, "DOM quiet wait finished");
                Ok(())
            }
            ReadyCondition::Load => Ok(()),
        }
    }

    /// Resolves `true` once no mutation has been seen for `quiet`, `false` if
    /// `timeout` elapsed first.
    async fn wait_for_dom_quiet(&self, quiet: Duration, timeout: Duration) -> Result<bool> {
        let js = format!(
            r#"
            new Promise(resolve => {{
                let timer;
                let cap;
                const finish = settled => {{
                    observer.disconnect();
                    clearTimeout(timer);
                    clearTimeout(cap);
                    resolve(settled);
                }};
                const observer = new MutationObserver(() => {{
                    clearTimeout(timer);
                    timer = setTimeout(() => finish(true), {quiet_ms});
                }});
                observer.observe(document, {{
                    childList: true,
                    subtree: true,
                    attributes: true,
                    characterData: true
                }});
                timer = setTimeout(() => finish(true), {quiet_ms});
                cap = setTimeout(() => finish(false), {timeout_ms});
            }})
            "#,
            quiet_ms = quiet.as_millis(),
            timeout_ms = timeout.as_millis(),
        );
        let params = EvaluateParams::builder()
            .expression(js)
            .await_promise(true)
            .return_by_value(true)
            .build()
            .map_err(Error::JsError)?;
        let result = self
            .inner
            .evaluate_expression(params)
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        Ok(result.into_value::<bool>()?)
    }

    /// Get the current page title.
    pub async fn title(&self) -> Result<String> {
        let result = self
            .inner
            .evaluate("document.title")
            .await
            .map_err(|e| Error::JsError(e.to_string()))?;
        match result.into_value::<String>() {
            Ok(title) => Ok(title),
            Err(_) => Ok(String::new()),
        }
    }

    // ── Element Queries ─────────────────────────────────────────────

    /// Find the first element matching the selector, `None` when nothing matches.
    pub async fn query(&self, selector: &str) -> Result<Option<Element>> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    /// Find all elements matching the selector, in document order.
    pub async fn query_all(&self, selector: &str) -> Result<Vec<Element>> {
        let els = self.inner.find_elements(selector).await?;
        Ok(els.into_iter().map(Element::new).collect())
    }
}
