use serde::{Deserialize, Serialize};

/// Text fingerprint of a known block page
///
/// # Example TOML
/// ```toml
/// [[body]]
/// region = "KR"
/// literal = true
/// pattern = "http://warning.or.kr"
/// ```
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct BodySignature {
    /// Regular expression, or verbatim text when `literal` is set
    pub pattern: String,

    #[serde(default)]
    pub literal: bool,

    /// ISO country code the fingerprint was observed in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Free-form provenance (vendor, product)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Response-header fingerprint (e.g. a `Location` pointing at a block page)
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct HeaderSignature {
    /// Header name, compared case-insensitively
    pub header: String,

    pub pattern: String,

    #[serde(default)]
    pub literal: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Capture error that identifies blocking at a specific vantage point
///
/// Empty `asns` matches any network in `country`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct ErrorFingerprint {
    pub country: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub asns: Vec<u32>,

    pub error_contains: String,
}

impl ErrorFingerprint {
    /// Check a session's vantage point and first recorded error
    pub fn matches(&self, country: Option<&str>, asn: Option<u32>, first_error: &str) -> bool {
        let Some(country) = country else {
            return false;
        };
        if !self.country.eq_ignore_ascii_case(country) {
            return false;
        }
        if !self.asns.is_empty() && !asn.is_some_and(|asn| self.asns.contains(&asn)) {
            return false;
        }
        first_error.contains(&self.error_contains)
    }
}

/// On-disk catalog layout
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CatalogFile {
    pub version: String,

    /// Exact final URLs of known block pages
    #[serde(default)]
    pub block_urls: Vec<String>,

    #[serde(default)]
    pub body: Vec<BodySignature>,

    #[serde(default)]
    pub header: Vec<HeaderSignature>,

    #[serde(default)]
    pub error: Vec<ErrorFingerprint>,

    /// Bodies that make a session unusable as evidence (seized domains)
    #[serde(default)]
    pub inconclusive: Vec<BodySignature>,
}
