// Page length classifier: content length relative to the baseline
//
// Ratios inside [band_low, band_high] are normal. Outside, confidence grows
// on a log scale from the band edge to the extreme ratio, so halving and
// doubling weigh the same.

use super::Classifier;
use crate::config::PageLengthThresholds;
use crate::evidence::Evidence;
use crate::judgment::Judgment;
use tracing::debug;

pub(crate) const NAME: &str = "page_length";

#[derive(Debug, Clone)]
pub struct PageLengthClassifier {
    thresholds: PageLengthThresholds,
}

impl PageLengthClassifier {
    pub fn new(thresholds: PageLengthThresholds) -> Self {
        Self { thresholds }
    }

    fn confidence(&self, ratio: f64) -> f64 {
        let t = &self.thresholds;
        if ratio < t.band_low {
            if ratio <= t.extreme_low {
                return 1.0;
            }
            (t.band_low / ratio).ln() / (t.band_low / t.extreme_low).ln()
        } else {
            if ratio >= t.extreme_high {
                return 1.0;
            }
            (ratio / t.band_high).ln() / (t.extreme_high / t.band_high).ln()
        }
    }
}

impl Default for PageLengthClassifier {
    fn default() -> Self {
        Self::new(PageLengthThresholds::default())
    }
}

impl Classifier for PageLengthClassifier {
    fn name(&self) -> &str {
        NAME
    }

    fn classify(&self, evidence: &Evidence) -> Judgment {
        let Some(baseline) = evidence.baseline() else {
            return Judgment::abstain(NAME, "no baseline");
        };
        let baseline_length = baseline.content_length();
        if baseline_length == 0 {
            return Judgment::abstain(NAME, "baseline has no content");
        }

        let ratio = evidence.content_length() as f64 / baseline_length as f64;
        debug!(ratio, baseline_length, "page length ratio");
        if (self.thresholds.band_low..=self.thresholds.band_high).contains(&ratio) {
            return Judgment::up(NAME);
        }
        Judgment::down(NAME, self.confidence(ratio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judgment::Status;

    fn classify(length: usize, baseline_length: usize) -> Judgment {
        let baseline = Evidence::builder("http://a.com/")
            .content("b".repeat(baseline_length))
            .build();
        let evidence = Evidence::builder("http://a.com/")
            .content("a".repeat(length))
            .baseline(baseline)
            .build();
        PageLengthClassifier::default().classify(&evidence)
    }

    #[test]
    fn test_inside_band_is_up() {
        for length in [500, 1_000, 2_000] {
            let judgment = classify(length, 1_000);
            assert_eq!(judgment.status(), Status::Up, "length {}", length);
            assert_eq!(judgment.confidence(), 0.0);
        }
    }

    #[test]
    fn test_far_below_band_is_near_max() {
        let judgment = classify(100, 1_000);
        assert!(judgment.is_down());
        assert!(judgment.confidence() >= 0.99);
    }

    #[test]
    fn test_confidence_grows_with_distance() {
        let near = classify(400, 1_000);
        let far = classify(200, 1_000);
        assert!(near.is_down() && far.is_down());
        assert!(far.confidence() > near.confidence());

        let big = classify(4_000, 1_000);
        assert!(big.is_down());
        assert!(big.confidence() > 0.0 && big.confidence() < 1.0);
        assert_eq!(classify(50_000, 1_000).confidence(), 1.0);
    }

    #[test]
    fn test_abstains_without_baseline() {
        let evidence = Evidence::builder("http://a.com/").content("abc").build();
        let judgment = PageLengthClassifier::default().classify(&evidence);
        assert!(judgment.is_abstained());
        assert_eq!(judgment.abstention_reason(), Some("no baseline"));
    }

    #[test]
    fn test_abstains_on_empty_baseline() {
        assert!(classify(100, 0).is_abstained());
    }
}
