// HTTP status code classifier: a hard 2xx boundary

use super::Classifier;
use crate::evidence::Evidence;
use crate::judgment::Judgment;
use tracing::debug;

pub(crate) const NAME: &str = "status_code";

/// Any final status outside 200..=299, or none at all, is Down with
/// confidence 1.0
#[derive(Debug, Clone, Default)]
pub struct StatusCodeClassifier;

impl StatusCodeClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Classifier for StatusCodeClassifier {
    fn name(&self) -> &str {
        NAME
    }

    fn classify(&self, evidence: &Evidence) -> Judgment {
        match evidence.status_code() {
            Some(code) if (200..300).contains(&code) => Judgment::up(NAME),
            Some(code) => {
                debug!(code, "non-2xx final status");
                Judgment::down(NAME, 1.0)
            }
            None => {
                debug!("no final status recorded");
                Judgment::down(NAME, 1.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judgment::Status;

    fn classify(status: Option<u16>) -> Judgment {
        let mut builder = Evidence::builder("http://example.com/");
        if let Some(code) = status {
            builder = builder.status_code(code);
        }
        StatusCodeClassifier::new().classify(&builder.build())
    }

    #[test]
    fn test_2xx_is_up() {
        for code in [200, 204, 299] {
            let judgment = classify(Some(code));
            assert_eq!(judgment.status(), Status::Up);
            assert_eq!(judgment.confidence(), 0.0);
        }
    }

    #[test]
    fn test_non_2xx_is_down() {
        for code in [199, 301, 403, 451, 503] {
            let judgment = classify(Some(code));
            assert_eq!(judgment.status(), Status::Down, "code {}", code);
            assert_eq!(judgment.confidence(), 1.0);
        }
    }

    #[test]
    fn test_missing_status_is_down() {
        let judgment = classify(None);
        assert!(judgment.is_down());
        assert_eq!(judgment.confidence(), 1.0);
        assert!(!judgment.is_abstained());
    }
}
