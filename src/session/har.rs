// HTTP Archive subset read by the session loader
//
// Only the fields classification needs are modelled. Everything is
// optional or defaulted so partial captures still load.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::warn;
use url::Url;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Har {
    #[serde(default)]
    pub log: HarLog,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarLog {
    #[serde(default)]
    pub pages: Vec<HarPage>,

    #[serde(default)]
    pub entries: Vec<HarEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarPage {
    pub id: String,

    #[serde(default)]
    pub page_timings: PageTimings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageTimings {
    /// -1 when the page never finished loading
    #[serde(default)]
    pub on_load: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarEntry {
    #[serde(default)]
    pub pageref: Option<String>,

    /// Total elapsed milliseconds
    #[serde(default)]
    pub time: Option<f64>,

    #[serde(default)]
    pub request: HarRequest,

    #[serde(default)]
    pub response: HarResponse,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarResponse {
    /// 0 when no response arrived
    #[serde(default)]
    pub status: i64,

    #[serde(default)]
    pub headers: Vec<HarHeader>,

    #[serde(default, rename = "redirectURL")]
    pub redirect_url: String,

    #[serde(default)]
    pub content: HarContent,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarContent {
    #[serde(default)]
    pub size: Option<i64>,

    #[serde(default)]
    pub text: Option<String>,

    #[serde(default)]
    pub encoding: Option<String>,
}

impl HarLog {
    pub fn page(&self, id: &str) -> Option<&HarPage> {
        self.pages.iter().find(|p| p.id == id)
    }

    /// Entries recorded for `page_id`, in capture order
    pub fn entries_for<'a>(&'a self, page_id: &'a str) -> impl Iterator<Item = &'a HarEntry> + 'a {
        self.entries
            .iter()
            .filter(move |e| e.pageref.as_deref() == Some(page_id))
    }
}

impl HarPage {
    /// `onLoad` when the page finished loading, else the summed entry times
    pub fn load_time_ms(&self, entries: &[&HarEntry]) -> Option<f64> {
        if let Some(on_load) = self.page_timings.on_load.filter(|ms| *ms >= 0.0) {
            return Some(on_load);
        }
        let times: Vec<f64> = entries
            .iter()
            .filter_map(|e| e.time)
            .filter(|ms| *ms >= 0.0)
            .collect();
        (!times.is_empty()).then(|| times.iter().sum())
    }
}

impl HarResponse {
    pub fn status_code(&self) -> Option<u16> {
        u16::try_from(self.status).ok().filter(|s| *s > 0)
    }

    fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status) && !self.redirect_url.is_empty()
    }

    /// Body as text; base64 bodies are decoded, invalid UTF-8 is replaced
    pub fn body_text(&self) -> Option<String> {
        let text = self.content.text.as_deref()?;
        if self.content.encoding.as_deref() == Some("base64") {
            match STANDARD.decode(text.trim()) {
                Ok(bytes) => return Some(String::from_utf8_lossy(&bytes).into_owned()),
                Err(e) => warn!(error = %e, "undecodable base64 body, using raw text"),
            }
        }
        Some(text.to_string())
    }

    pub fn header_pairs(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|h| (h.name.clone(), h.value.clone()))
            .collect()
    }
}

/// Where a page's fetch ended up
#[derive(Debug, Clone)]
pub struct Landing<'a> {
    /// Last response captured on the redirect chain
    pub entry: &'a HarEntry,

    /// URL the chain ended at, when at least one redirect was followed
    pub final_url: Option<String>,
}

/// Follow 3xx `redirectURL`s from the page's first entry
///
/// A redirect to a URL that was never captured ends the chain at that URL;
/// the redirect response stays the landing entry.
pub fn follow_redirects<'a>(entries: &[&'a HarEntry]) -> Option<Landing<'a>> {
    let mut entry = *entries.first()?;
    let mut final_url = None;
    let mut visited = HashSet::new();

    while entry.response.is_redirect() && visited.insert(entry.request.url.as_str()) {
        let target = resolve(&entry.request.url, &entry.response.redirect_url);
        let next = entries.iter().find(|e| e.request.url == target).copied();
        final_url = Some(target);
        match next {
            Some(next) => entry = next,
            None => break,
        }
    }
    Some(Landing { entry, final_url })
}

/// Resolve a possibly relative `Location` against the request URL
fn resolve(base: &str, location: &str) -> String {
    Url::parse(base)
        .and_then(|b| b.join(location))
        .map(String::from)
        .unwrap_or_else(|_| location.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str, status: i64, location: &str) -> HarEntry {
        HarEntry {
            pageref: Some("page_1".to_string()),
            time: Some(10.0),
            request: HarRequest {
                url: url.to_string(),
            },
            response: HarResponse {
                status,
                redirect_url: location.to_string(),
                ..HarResponse::default()
            },
        }
    }

    #[test]
    fn test_no_redirect_has_no_final_url() {
        let a = entry("http://a.com/", 200, "");
        let landing = follow_redirects(&[&a]).unwrap();
        assert_eq!(landing.entry.request.url, "http://a.com/");
        assert!(landing.final_url.is_none());
    }

    #[test]
    fn test_follows_relative_and_absolute_redirects() {
        let a = entry("http://a.com/", 301, "https://www.a.com/");
        let b = entry("https://www.a.com/", 302, "/home");
        let c = entry("https://www.a.com/home", 200, "");
        let landing = follow_redirects(&[&a, &b, &c]).unwrap();
        assert_eq!(landing.entry.response.status, 200);
        assert_eq!(landing.final_url.as_deref(), Some("https://www.a.com/home"));
    }

    #[test]
    fn test_uncaptured_target_ends_chain() {
        let a = entry("http://a.com/", 302, "http://blocked.zajil.com/");
        let landing = follow_redirects(&[&a]).unwrap();
        assert_eq!(landing.entry.response.status, 302);
        assert_eq!(
            landing.final_url.as_deref(),
            Some("http://blocked.zajil.com/")
        );
    }

    #[test]
    fn test_redirect_loop_terminates() {
        let a = entry("http://a.com/", 302, "http://b.com/");
        let b = entry("http://b.com/", 302, "http://a.com/");
        let landing = follow_redirects(&[&a, &b]).unwrap();
        assert!(landing.final_url.is_some());
    }

    #[test]
    fn test_base64_body_decoded() {
        let response = HarResponse {
            content: HarContent {
                size: Some(5),
                text: Some("aGVsbG8=".to_string()),
                encoding: Some("base64".to_string()),
            },
            ..HarResponse::default()
        };
        assert_eq!(response.body_text().as_deref(), Some("hello"));
    }

    #[test]
    fn test_load_time_falls_back_to_entry_times() {
        let page = HarPage {
            id: "page_1".to_string(),
            page_timings: PageTimings { on_load: Some(-1.0) },
        };
        let a = entry("http://a.com/", 200, "");
        let b = entry("http://a.com/x.css", 200, "");
        assert_eq!(page.load_time_ms(&[&a, &b]), Some(20.0));
        assert_eq!(page.load_time_ms(&[]), None);
    }
}
