// Heuristic thresholds for the leaf classifiers
//
// Every value here is a fixed heuristic, not something learned. They live in
// TOML so a retuned table can ship without a rebuild; Default carries the
// shipped values.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Threshold table, one section per classifier
///
/// # Example
/// ```
/// use pageverdict::config::Thresholds;
///
/// let thresholds = Thresholds::default();
/// assert_eq!(thresholds.empty_page.min_length, 300);
/// assert!(thresholds.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Thresholds {
    pub error: ErrorThresholds,
    pub throttle: ThrottleThresholds,
    pub empty_page: EmptyPageThresholds,
    pub differing_domain: DifferingDomainThresholds,
    pub page_length: PageLengthThresholds,
    pub cosine_similarity: CosineThresholds,
    pub block_page: BlockPageThresholds,
}

impl Thresholds {
    pub fn validate(&self) -> Result<()> {
        self.error.validate()?;
        self.throttle.validate()?;
        self.empty_page.validate()?;
        self.differing_domain.validate()?;
        self.page_length.validate()?;
        self.cosine_similarity.validate()?;
        self.block_page.validate()
    }
}

fn check_unit(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::InvalidThreshold(format!(
            "{} must be in [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

/// Error classifier: fatal patterns and the count cap
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ErrorThresholds {
    /// Case-insensitive substrings that make any single error conclusive
    pub fatal_patterns: Vec<String>,

    /// Error count at which unrecognized errors reach confidence 1.0
    pub count_cap: usize,
}

impl Default for ErrorThresholds {
    fn default() -> Self {
        Self {
            fatal_patterns: [
                "connection reset",
                "connection refused",
                "connection closed",
                "recv failure",
                "empty reply from server",
                "timed out",
                "timeout",
                "could not resolve",
                "name_not_resolved",
                "name not resolved",
                "dns",
                "operation canceled",
                "failed to connect",
                "ssl",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            count_cap: 4,
        }
    }
}

impl ErrorThresholds {
    fn validate(&self) -> Result<()> {
        if self.count_cap == 0 {
            return Err(Error::InvalidThreshold(
                "error.count_cap must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Throttle classifier: slowdown band relative to an expected load time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThrottleThresholds {
    /// Expected load time when no baseline timing exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_load_ms: Option<f64>,

    /// Slowdown factor at which the page starts counting as throttled
    pub slowdown_threshold: f64,

    /// Slowdown factor at which confidence saturates at 1.0
    pub slowdown_saturation: f64,
}

impl Default for ThrottleThresholds {
    fn default() -> Self {
        Self {
            expected_load_ms: None,
            slowdown_threshold: 3.0,
            slowdown_saturation: 10.0,
        }
    }
}

impl ThrottleThresholds {
    fn validate(&self) -> Result<()> {
        if let Some(expected) = self.expected_load_ms {
            if !(expected > 0.0) {
                return Err(Error::InvalidThreshold(format!(
                    "throttle.expected_load_ms must be positive, got {}",
                    expected
                )));
            }
        }
        if !(self.slowdown_threshold >= 1.0 && self.slowdown_saturation > self.slowdown_threshold) {
            return Err(Error::InvalidThreshold(format!(
                "throttle requires 1 <= slowdown_threshold < slowdown_saturation, got {} / {}",
                self.slowdown_threshold, self.slowdown_saturation
            )));
        }
        Ok(())
    }
}

/// Empty page classifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmptyPageThresholds {
    /// Pages shorter than this (bytes) count as empty
    pub min_length: usize,

    /// At or below this length confidence is 1.0
    pub near_zero_length: usize,
}

impl Default for EmptyPageThresholds {
    fn default() -> Self {
        Self {
            min_length: 300,
            near_zero_length: 16,
        }
    }
}

impl EmptyPageThresholds {
    fn validate(&self) -> Result<()> {
        if self.min_length == 0 || self.near_zero_length >= self.min_length {
            return Err(Error::InvalidThreshold(format!(
                "empty_page requires near_zero_length < min_length and min_length > 0, got {} / {}",
                self.near_zero_length, self.min_length
            )));
        }
        Ok(())
    }
}

/// Differing domain classifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DifferingDomainThresholds {
    /// Confidence reported for an unexplained cross-domain redirect
    pub confidence: f64,

    /// Groups of registrable domains run by the same organization
    pub equivalent_domains: Vec<Vec<String>>,
}

impl Default for DifferingDomainThresholds {
    fn default() -> Self {
        Self {
            confidence: 0.9,
            equivalent_domains: vec![
                vec!["google.com".into(), "youtube.com".into(), "goo.gl".into()],
                vec!["facebook.com".into(), "fb.com".into(), "fb.me".into()],
                vec!["twitter.com".into(), "x.com".into(), "t.co".into()],
                vec!["wikipedia.org".into(), "wikimedia.org".into()],
            ],
        }
    }
}

impl DifferingDomainThresholds {
    fn validate(&self) -> Result<()> {
        check_unit("differing_domain.confidence", self.confidence)
    }
}

/// Page length classifier: accepted band of length ratios
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PageLengthThresholds {
    pub band_low: f64,
    pub band_high: f64,

    /// Ratio at or below which confidence saturates
    pub extreme_low: f64,

    /// Ratio at or above which confidence saturates
    pub extreme_high: f64,
}

impl Default for PageLengthThresholds {
    fn default() -> Self {
        Self {
            band_low: 0.5,
            band_high: 2.0,
            extreme_low: 0.1,
            extreme_high: 10.0,
        }
    }
}

impl PageLengthThresholds {
    fn validate(&self) -> Result<()> {
        let ordered = 0.0 < self.extreme_low
            && self.extreme_low < self.band_low
            && self.band_low < 1.0
            && 1.0 < self.band_high
            && self.band_high < self.extreme_high;
        if !ordered {
            return Err(Error::InvalidThreshold(format!(
                "page_length requires 0 < extreme_low < band_low < 1 < band_high < extreme_high, got {} / {} / {} / {}",
                self.extreme_low, self.band_low, self.band_high, self.extreme_high
            )));
        }
        Ok(())
    }
}

/// Cosine similarity classifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CosineThresholds {
    /// Similarity below which a page differs from its baseline
    pub threshold: f64,
}

impl Default for CosineThresholds {
    fn default() -> Self {
        Self { threshold: 0.816 }
    }
}

impl CosineThresholds {
    fn validate(&self) -> Result<()> {
        check_unit("cosine_similarity.threshold", self.threshold)?;
        if self.threshold == 0.0 {
            return Err(Error::InvalidThreshold(
                "cosine_similarity.threshold must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Block page signature classifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BlockPageThresholds {
    /// Confidence reported on any signature hit
    pub confidence: f64,
}

impl Default for BlockPageThresholds {
    fn default() -> Self {
        Self { confidence: 1.0 }
    }
}

impl BlockPageThresholds {
    fn validate(&self) -> Result<()> {
        check_unit("block_page.confidence", self.confidence)
    }
}
