//! Session documents: loading captured fetches into [`Evidence`]
//!
//! A session document pairs a requested URL with a HAR capture and
//! per-page details recorded by the vantage point:
//!
//! ```json
//! {
//!   "url": "http://example.com/",
//!   "baseline": "page_0",
//!   "pageDetail": { "page_1": { "asn": 64500, "countryCode": "tr", "errors": [] } },
//!   "har": { "log": { "pages": [...], "entries": [...] } }
//! }
//! ```
//!
//! The target page is the last HAR page that is not the baseline. The
//! baseline page, when `baseline` names one present in the HAR, becomes
//! the target's comparison evidence.

pub mod har;
mod screen;

pub use screen::{screen, Inconclusive};

use crate::classifier::Classifier;
use crate::error::{self, Error, Result};
use crate::evidence::Evidence;
use crate::judgment::Judgment;
use crate::pipeline::ClassifyPipeline;
use crate::signatures::SignatureCatalog;
use har::{Har, HarEntry, HarLog, HarPage};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info, warn};

/// `baseline` is `false` or a page id
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum BaselineRef {
    Flag(bool),
    Page(String),
}

impl Default for BaselineRef {
    fn default() -> Self {
        BaselineRef::Flag(false)
    }
}

impl BaselineRef {
    pub fn page_id(&self) -> Option<&str> {
        match self {
            BaselineRef::Page(id) => Some(id),
            BaselineRef::Flag(_) => None,
        }
    }
}

/// Vantage-point details for one page
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDetail {
    #[serde(default)]
    pub asn: Option<u32>,

    #[serde(default)]
    pub country_code: Option<String>,

    /// Screenshot as a data URI
    #[serde(default)]
    pub screenshot: Option<String>,

    #[serde(default)]
    pub errors: Vec<String>,
}

/// Raw session document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDocument {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub baseline: BaselineRef,

    #[serde(default)]
    pub page_detail: HashMap<String, PageDetail>,

    #[serde(default)]
    pub har: Option<Har>,
}

impl SessionDocument {
    /// Normalize into the target page's evidence
    ///
    /// # Errors
    /// [`Error::MalformedSession`] when the document has no URL, no HAR
    /// pages, or only the baseline page.
    pub fn into_evidence(self) -> Result<Evidence> {
        let url = self
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Error::MalformedSession("missing \"url\"".to_string()))?;
        let log = self
            .har
            .as_ref()
            .map(|h| &h.log)
            .ok_or_else(|| Error::MalformedSession("missing \"har\"".to_string()))?;
        if log.pages.is_empty() {
            return Err(Error::MalformedSession("HAR has no pages".to_string()));
        }

        let baseline_id = self.baseline.page_id();
        let target = log
            .pages
            .iter()
            .rev()
            .find(|p| Some(p.id.as_str()) != baseline_id)
            .ok_or_else(|| {
                Error::MalformedSession("HAR holds no page besides the baseline".to_string())
            })?;

        let baseline = match baseline_id {
            Some(id) => match log.page(id) {
                Some(page) => Some(self.page_evidence(url, log, page, None)),
                None => {
                    warn!(baseline = id, "baseline page not found in HAR");
                    None
                }
            },
            None => None,
        };

        debug!(page = %target.id, has_baseline = baseline.is_some(), "target page selected");
        Ok(self.page_evidence(url, log, target, baseline))
    }

    fn page_evidence(
        &self,
        url: &str,
        log: &HarLog,
        page: &HarPage,
        baseline: Option<Evidence>,
    ) -> Evidence {
        let entries: Vec<&HarEntry> = log.entries_for(&page.id).collect();
        let mut builder = Evidence::builder(url).page_id(&page.id);

        if let Some(ms) = page.load_time_ms(&entries) {
            builder = builder.load_time_ms(ms);
        }

        match har::follow_redirects(&entries) {
            Some(landing) => {
                let response = &landing.entry.response;
                if let Some(final_url) = landing.final_url {
                    builder = builder.final_url(final_url);
                }
                if let Some(status) = response.status_code() {
                    builder = builder.status_code(status);
                }
                if let Some(body) = response.body_text() {
                    builder = builder.content(body);
                }
                for (name, value) in response.header_pairs() {
                    builder = builder.header(name, value);
                }
            }
            None => debug!(page = %page.id, "page has no entries"),
        }
        for entry in &entries {
            builder = builder.exchange(&entry.request.url, entry.response.header_pairs());
        }

        if let Some(detail) = self.page_detail.get(&page.id) {
            builder = builder.errors(detail.errors.iter().cloned());
            if let Some(asn) = detail.asn {
                builder = builder.asn(asn);
            }
            if let Some(country) = &detail.country_code {
                builder = builder.country_code(country);
            }
            if let Some(screenshot) = &detail.screenshot {
                builder = builder.screenshot(screenshot);
            }
        }

        if let Some(baseline) = baseline {
            builder = builder.baseline(baseline);
        }
        builder.build()
    }
}

/// Parse a session document from JSON bytes
pub fn parse_slice(bytes: &[u8]) -> Result<Evidence> {
    let document: SessionDocument = serde_json::from_slice(bytes)?;
    document.into_evidence()
}

/// Parse a session document from a JSON string
pub fn parse_str(json: &str) -> Result<Evidence> {
    parse_slice(json.as_bytes())
}

/// Load a session document from disk
pub fn load<P: AsRef<Path>>(path: P) -> Result<Evidence> {
    let content = error::read_to_string(path.as_ref())?;
    parse_str(&content)
}

/// Screen, then classify
///
/// An inconclusive session yields `pipeline.abstain_all` with the
/// screening reason; anything else is classified normally.
pub fn classify_session(
    pipeline: &ClassifyPipeline,
    catalog: &SignatureCatalog,
    evidence: &Evidence,
) -> Judgment {
    match screen(evidence, catalog) {
        Some(inconclusive) => {
            info!(page = evidence.page_id().unwrap_or("-"), reason = %inconclusive, "session screened out");
            pipeline.abstain_all(&inconclusive.to_string())
        }
        None => pipeline.classify(evidence),
    }
}

#[cfg(test)]
mod tests;
