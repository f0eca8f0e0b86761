// Capture error classifier
//
// Any recorded error is evidence of inaccessibility. A recognized fatal
// pattern is conclusive on its own; unrecognized errors add up toward 1.0
// with count. A region fingerprint on the first error marks deliberate
// blocking at that vantage point. A clean capture says nothing either way,
// so it abstains.

use super::Classifier;
use crate::config::ErrorThresholds;
use crate::evidence::Evidence;
use crate::judgment::Judgment;
use crate::signatures::SignatureCatalog;
use std::sync::Arc;
use tracing::debug;

pub(crate) const NAME: &str = "error";

#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    /// Lower-cased once at construction
    fatal_patterns: Vec<String>,
    count_cap: usize,
    catalog: Arc<SignatureCatalog>,
}

impl ErrorClassifier {
    pub fn new(thresholds: ErrorThresholds, catalog: Arc<SignatureCatalog>) -> Self {
        Self {
            fatal_patterns: thresholds
                .fatal_patterns
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
            count_cap: thresholds.count_cap.max(1),
            catalog,
        }
    }

    fn fatal_pattern(&self, message: &str) -> Option<&str> {
        let message = message.to_lowercase();
        self.fatal_patterns
            .iter()
            .find(|p| message.contains(p.as_str()))
            .map(String::as_str)
    }
}

impl Classifier for ErrorClassifier {
    fn name(&self) -> &str {
        NAME
    }

    fn classify(&self, evidence: &Evidence) -> Judgment {
        let errors = evidence.errors();
        let Some(first) = errors.first() else {
            return Judgment::abstain(NAME, "no errors recorded");
        };

        let fatal = errors.iter().find_map(|e| self.fatal_pattern(e));
        let confidence = match fatal {
            Some(pattern) => {
                debug!(pattern, "fatal capture error");
                1.0
            }
            None => errors.len().min(self.count_cap) as f64 / self.count_cap as f64,
        };

        let judgment = Judgment::down(NAME, confidence);
        match self
            .catalog
            .match_error(evidence.country_code(), evidence.asn(), first)
        {
            Some(fingerprint) => {
                debug!(
                    country = %fingerprint.country,
                    error = %fingerprint.error_contains,
                    "region error fingerprint"
                );
                judgment.blocked()
            }
            None => judgment,
        }
    }
}
