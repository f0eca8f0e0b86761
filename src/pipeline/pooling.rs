// Pooling rules and status policies for composite pipelines

use crate::judgment::Status;
use serde::{Deserialize, Serialize};

/// How constituent confidences combine into the pipeline's confidence
///
/// Only non-abstaining constituents take part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pooling {
    /// Weighted mean of all conclusive confidences (Up counts as 0.0)
    #[default]
    Average,
    /// Highest conclusive confidence
    Max,
    /// Tally of Down evidence, strongest first:
    /// `c += (1 - c) * confidence * weight / max_weight`
    NoisyOr,
}

/// One conclusive constituent as seen by a pooling rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored {
    pub status: Status,
    pub confidence: f64,
    pub weight: f64,
}

impl Pooling {
    /// Pool `scored`; an empty slice pools to 0.0
    pub fn pool(&self, scored: &[Scored]) -> f64 {
        if scored.is_empty() {
            return 0.0;
        }
        let pooled = match self {
            Pooling::Average => {
                let total: f64 = scored.iter().map(|s| s.weight).sum();
                if total <= 0.0 {
                    return 0.0;
                }
                scored.iter().map(|s| s.confidence * s.weight).sum::<f64>() / total
            }
            Pooling::Max => scored.iter().map(|s| s.confidence).fold(0.0, f64::max),
            Pooling::NoisyOr => noisy_or(scored),
        };
        pooled.clamp(0.0, 1.0)
    }
}

fn noisy_or(scored: &[Scored]) -> f64 {
    let mut downs: Vec<&Scored> = scored.iter().filter(|s| s.status == Status::Down).collect();
    if downs.is_empty() {
        return 0.0;
    }
    // Stable sort keeps configured order among ties
    downs.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    let max_weight = downs.iter().map(|s| s.weight).fold(0.0, f64::max);
    if max_weight <= 0.0 {
        return 0.0;
    }
    downs.iter().fold(0.0, |c, s| {
        c + (1.0 - c) * s.confidence * s.weight / max_weight
    })
}

/// How a non-abstaining pipeline turns its pooled confidence into a status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusPolicy {
    /// Down on any pooled Down evidence, however weak; confidence still
    /// carries the pooled value. Compatibility with consumers of the
    /// historical verdict format.
    PinnedDown,
    /// Down iff pooled confidence reaches the pipeline's `down_threshold`
    #[default]
    Threshold,
}

impl StatusPolicy {
    pub fn resolve(&self, pooled: f64, down_threshold: f64) -> Status {
        match self {
            StatusPolicy::PinnedDown if pooled > 0.0 => Status::Down,
            StatusPolicy::PinnedDown => Status::Up,
            StatusPolicy::Threshold if pooled > 0.0 && pooled >= down_threshold => Status::Down,
            StatusPolicy::Threshold => Status::Up,
        }
    }
}
