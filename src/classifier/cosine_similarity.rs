//! Cosine similarity of page text against the baseline
//!
//! Both documents are tokenized into lower-cased alphanumeric terms and
//! turned into term-frequency vectors over their shared vocabulary. Vectors
//! are ordered maps so the floating-point sums run in the same order on
//! every evaluation.

use super::Classifier;
use crate::config::CosineThresholds;
use crate::evidence::Evidence;
use crate::judgment::Judgment;
use std::collections::BTreeMap;
use tracing::debug;

pub(crate) const NAME: &str = "cosine_similarity";

#[derive(Debug, Clone)]
pub struct CosineSimilarityClassifier {
    thresholds: CosineThresholds,
}

impl CosineSimilarityClassifier {
    pub fn new(thresholds: CosineThresholds) -> Self {
        Self { thresholds }
    }
}

impl Default for CosineSimilarityClassifier {
    fn default() -> Self {
        Self::new(CosineThresholds::default())
    }
}

impl Classifier for CosineSimilarityClassifier {
    fn name(&self) -> &str {
        NAME
    }

    fn classify(&self, evidence: &Evidence) -> Judgment {
        let Some(baseline) = evidence.baseline() else {
            return Judgment::abstain(NAME, "no baseline");
        };
        let Some(baseline_text) = baseline.content().filter(|c| !c.trim().is_empty()) else {
            return Judgment::abstain(NAME, "baseline has no content");
        };

        let similarity = cosine_similarity(evidence.content().unwrap_or(""), baseline_text);
        let threshold = self.thresholds.threshold;
        debug!(similarity, threshold, "cosine similarity");
        if similarity >= threshold {
            return Judgment::up(NAME);
        }
        Judgment::down(NAME, (threshold - similarity) / threshold)
    }
}

/// Cosine similarity of two texts' term-frequency vectors
///
/// Returns 0.0 when either text has no terms.
///
/// # Example
/// ```
/// use pageverdict::classifier::cosine_similarity;
///
/// assert!(cosine_similarity("the cat sat", "The cat sat!") > 0.999);
/// assert_eq!(cosine_similarity("alpha beta", "gamma delta"), 0.0);
/// assert_eq!(cosine_similarity("", "anything"), 0.0);
/// ```
pub fn cosine_similarity(a: &str, b: &str) -> f64 {
    let a = term_frequencies(a);
    let b = term_frequencies(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let dot: f64 = a
        .iter()
        .filter_map(|(term, &x)| b.get(term).map(|&y| x * y))
        .sum();
    let norm_a = norm(&a);
    let norm_b = norm(&b);
    if norm_a < 1e-10 || norm_b < 1e-10 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)).clamp(0.0, 1.0)
}

fn term_frequencies(text: &str) -> BTreeMap<String, f64> {
    let mut counts = BTreeMap::new();
    for token in text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
        *counts.entry(token.to_lowercase()).or_insert(0.0) += 1.0;
    }
    counts
}

fn norm(vector: &BTreeMap<String, f64>) -> f64 {
    vector.values().map(|x| x * x).sum::<f64>().sqrt()
}
