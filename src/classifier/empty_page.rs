// Empty page classifier

use super::Classifier;
use crate::config::EmptyPageThresholds;
use crate::evidence::Evidence;
use crate::judgment::Judgment;
use tracing::debug;

pub(crate) const NAME: &str = "empty_page";

/// Short pages are Down; confidence grows as the page shrinks and
/// saturates at `near_zero_length`
#[derive(Debug, Clone)]
pub struct EmptyPageClassifier {
    thresholds: EmptyPageThresholds,
}

impl EmptyPageClassifier {
    pub fn new(thresholds: EmptyPageThresholds) -> Self {
        Self { thresholds }
    }
}

impl Default for EmptyPageClassifier {
    fn default() -> Self {
        Self::new(EmptyPageThresholds::default())
    }
}

impl Classifier for EmptyPageClassifier {
    fn name(&self) -> &str {
        NAME
    }

    fn classify(&self, evidence: &Evidence) -> Judgment {
        let length = evidence.content_length();
        let min = self.thresholds.min_length;
        if length >= min {
            return Judgment::up(NAME);
        }

        let near_zero = self.thresholds.near_zero_length;
        let confidence = if length <= near_zero {
            1.0
        } else {
            (min - length) as f64 / (min - near_zero) as f64
        };
        debug!(length, confidence, "short page");
        Judgment::down(NAME, confidence)
    }
}
