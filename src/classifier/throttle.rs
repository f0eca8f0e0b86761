// Throttle classifier: load time against an expected load time
//
// The expectation comes from the baseline's load time when one was
// captured, otherwise from the configured `expected_load_ms`.

use super::Classifier;
use crate::config::ThrottleThresholds;
use crate::evidence::Evidence;
use crate::judgment::Judgment;
use tracing::debug;

pub(crate) const NAME: &str = "throttle";

#[derive(Debug, Clone)]
pub struct ThrottleClassifier {
    thresholds: ThrottleThresholds,
}

impl ThrottleClassifier {
    pub fn new(thresholds: ThrottleThresholds) -> Self {
        Self { thresholds }
    }

    fn expected_load_ms(&self, evidence: &Evidence) -> Option<f64> {
        evidence
            .baseline()
            .and_then(Evidence::load_time_ms)
            .filter(|ms| *ms > 0.0)
            .or(self.thresholds.expected_load_ms)
    }
}

impl Default for ThrottleClassifier {
    fn default() -> Self {
        Self::new(ThrottleThresholds::default())
    }
}

impl Classifier for ThrottleClassifier {
    fn name(&self) -> &str {
        NAME
    }

    fn classify(&self, evidence: &Evidence) -> Judgment {
        let Some(load_ms) = evidence.load_time_ms() else {
            return Judgment::abstain(NAME, "no load time recorded");
        };
        let Some(expected_ms) = self.expected_load_ms(evidence) else {
            return Judgment::abstain(NAME, "no baseline load time or configured expectation");
        };

        let slowdown = load_ms / expected_ms;
        let threshold = self.thresholds.slowdown_threshold;
        debug!(load_ms, expected_ms, slowdown, "throttle ratio");
        if slowdown <= threshold {
            return Judgment::up(NAME);
        }

        // Linear from 0 at the threshold to 1 at saturation
        let span = self.thresholds.slowdown_saturation - threshold;
        Judgment::down(NAME, (slowdown - threshold) / span)
    }
}
