use chromiumoxide::element::Element as CrElement;

use crate::error::Result;

/// Wrapper around a chromiumoxide Element exposing the reads a scan needs.
pub struct Element {
    inner: CrElement,
}

impl Element {
    pub(crate) fn new(inner: CrElement) -> Self {
        Self { inner }
    }

    /// Returns a reference to the underlying chromiumoxide Element.
    pub fn inner(&self) -> &CrElement {
        &self.inner
    }

    /// Get the raw value of an attribute, `None` when the attribute is absent.
    pub async fn attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self.inner.attribute(name).await?)
    }

    /// Get a DOM property as a string, `None` unless it holds a string.
    ///
    /// Properties are resolved by the browser, so `src` on an image yields
    /// an absolute URL where the attribute may be relative.
    pub async fn string_property(&self, name: &str) -> Result<Option<String>> {
        let value = self.inner.property(name).await?;
        Ok(value.and_then(|v| v.as_str().map(str::to_owned)))
    }

    /// Get the rendered text of this element.
    pub async fn inner_text(&self) -> Result<Option<String>> {
        Ok(self.inner.inner_text().await?)
    }
}
