//! Evidence model: everything captured for one page fetch
//!
//! An [`Evidence`] is an immutable, cheaply clonable handle. Classifiers only
//! ever read it, and the pipeline hands clones to its worker threads.
//! `content_length` is derived from `content` at build time and cannot be set
//! independently.

use std::sync::Arc;

/// Captured data for one page-fetch attempt
#[derive(Debug, Clone)]
pub struct Evidence {
    inner: Arc<EvidenceData>,
}

/// One captured response on the page, redirects included
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

#[derive(Debug)]
struct EvidenceData {
    page_id: Option<String>,
    requested_url: String,
    final_url: Option<String>,
    status_code: Option<u16>,
    load_time_ms: Option<f64>,
    errors: Vec<String>,
    content: Option<String>,
    content_length: usize,
    response_headers: Vec<(String, String)>,
    exchanges: Vec<Exchange>,
    screenshot: Option<String>,
    asn: Option<u32>,
    country_code: Option<String>,
    baseline: Option<Evidence>,
}

impl Evidence {
    /// Start building evidence for a request to `requested_url`
    pub fn builder(requested_url: impl Into<String>) -> EvidenceBuilder {
        EvidenceBuilder::new(requested_url)
    }

    /// Identifier of the page inside its session document, if any
    pub fn page_id(&self) -> Option<&str> {
        self.inner.page_id.as_deref()
    }

    pub fn requested_url(&self) -> &str {
        &self.inner.requested_url
    }

    /// URL after redirects; `None` when no redirect was recorded
    pub fn final_url(&self) -> Option<&str> {
        self.inner.final_url.as_deref()
    }

    pub fn status_code(&self) -> Option<u16> {
        self.inner.status_code
    }

    pub fn load_time_ms(&self) -> Option<f64> {
        self.inner.load_time_ms
    }

    /// Errors recorded during capture, in order (empty when none)
    pub fn errors(&self) -> &[String] {
        &self.inner.errors
    }

    pub fn content(&self) -> Option<&str> {
        self.inner.content.as_deref()
    }

    /// Length of `content` in bytes (0 when absent)
    pub fn content_length(&self) -> usize {
        self.inner.content_length
    }

    /// Headers of the final response as `(name, value)` pairs
    pub fn response_headers(&self) -> &[(String, String)] {
        &self.inner.response_headers
    }

    /// Every response captured for the page, in capture order
    ///
    /// Redirect hops keep their own headers here; `response_headers` only
    /// holds the landing response.
    pub fn exchanges(&self) -> &[Exchange] {
        &self.inner.exchanges
    }

    /// Screenshot data URI; carried through, never interpreted
    pub fn screenshot(&self) -> Option<&str> {
        self.inner.screenshot.as_deref()
    }

    pub fn asn(&self) -> Option<u32> {
        self.inner.asn
    }

    /// Upper-cased ISO country code of the vantage point
    pub fn country_code(&self) -> Option<&str> {
        self.inner.country_code.as_deref()
    }

    /// Session presumed reachable, used by comparison classifiers
    pub fn baseline(&self) -> Option<&Evidence> {
        self.inner.baseline.as_ref()
    }

    /// Case-insensitive lookup of the first response header named `name`
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner
            .response_headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Builder for [`Evidence`]
///
/// # Example
/// ```
/// use pageverdict::evidence::Evidence;
///
/// let evidence = Evidence::builder("http://example.com/")
///     .status_code(200)
///     .content("<html>hello</html>")
///     .build();
/// assert_eq!(evidence.content_length(), 18);
/// assert!(evidence.errors().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct EvidenceBuilder {
    page_id: Option<String>,
    requested_url: String,
    final_url: Option<String>,
    status_code: Option<u16>,
    load_time_ms: Option<f64>,
    errors: Vec<String>,
    content: Option<String>,
    response_headers: Vec<(String, String)>,
    exchanges: Vec<Exchange>,
    screenshot: Option<String>,
    asn: Option<u32>,
    country_code: Option<String>,
    baseline: Option<Evidence>,
}

impl EvidenceBuilder {
    pub fn new(requested_url: impl Into<String>) -> Self {
        Self {
            requested_url: requested_url.into(),
            ..Self::default()
        }
    }

    pub fn page_id(mut self, id: impl Into<String>) -> Self {
        self.page_id = Some(id.into());
        self
    }

    pub fn final_url(mut self, url: impl Into<String>) -> Self {
        self.final_url = Some(url.into());
        self
    }

    pub fn status_code(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    /// Negative or non-finite durations are dropped
    pub fn load_time_ms(mut self, ms: f64) -> Self {
        self.load_time_ms = (ms.is_finite() && ms >= 0.0).then_some(ms);
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.errors.push(message.into());
        self
    }

    pub fn errors<I, S>(mut self, messages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.errors.extend(messages.into_iter().map(Into::into));
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.response_headers.push((name.into(), value.into()));
        self
    }

    pub fn exchange(mut self, url: impl Into<String>, headers: Vec<(String, String)>) -> Self {
        self.exchanges.push(Exchange {
            url: url.into(),
            headers,
        });
        self
    }

    pub fn screenshot(mut self, data_uri: impl Into<String>) -> Self {
        self.screenshot = Some(data_uri.into());
        self
    }

    pub fn asn(mut self, asn: u32) -> Self {
        self.asn = Some(asn);
        self
    }

    pub fn country_code(mut self, code: impl AsRef<str>) -> Self {
        let code = code.as_ref().trim();
        self.country_code = (!code.is_empty()).then(|| code.to_ascii_uppercase());
        self
    }

    pub fn baseline(mut self, baseline: Evidence) -> Self {
        self.baseline = Some(baseline);
        self
    }

    pub fn build(self) -> Evidence {
        let content_length = self.content.as_ref().map_or(0, String::len);
        Evidence {
            inner: Arc::new(EvidenceData {
                page_id: self.page_id,
                requested_url: self.requested_url,
                final_url: self.final_url,
                status_code: self.status_code,
                load_time_ms: self.load_time_ms,
                errors: self.errors,
                content: self.content,
                content_length,
                response_headers: self.response_headers,
                exchanges: self.exchanges,
                screenshot: self.screenshot,
                asn: self.asn,
                country_code: self.country_code,
                baseline: self.baseline,
            }),
        }
    }
}
