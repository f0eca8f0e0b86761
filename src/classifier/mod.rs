//! Classifiers: the capability contract and the fixed set of kinds
//!
//! Every classifier is a pure function of one [`Evidence`]: no shared
//! mutable state, no I/O, deterministic for identical input. A classifier
//! that cannot judge returns an abstaining [`Judgment`] instead of failing.
//!
//! [`ClassifierKind`] is the tagged variant the pipeline holds; the set is
//! closed so dispatch is an exhaustive `match`.

mod block_page;
mod cosine_similarity;
mod differing_domain;
mod empty_page;
mod error;
mod page_length;
mod status_code;
mod throttle;

pub use block_page::BlockPageClassifier;
pub use cosine_similarity::{cosine_similarity, CosineSimilarityClassifier};
pub use differing_domain::DifferingDomainClassifier;
pub use empty_page::EmptyPageClassifier;
pub use error::ErrorClassifier;
pub use page_length::PageLengthClassifier;
pub use status_code::StatusCodeClassifier;
pub use throttle::ThrottleClassifier;

use crate::config::Thresholds;
use crate::evidence::Evidence;
use crate::judgment::Judgment;
use crate::pipeline::ClassifyPipeline;
use crate::signatures::SignatureCatalog;
use std::sync::Arc;

/// Shared classify capability
pub trait Classifier: Send + Sync {
    /// Name reported in the `classifier` field of every judgment
    fn name(&self) -> &str;

    /// Judge one evidence record; never fails
    fn classify(&self, evidence: &Evidence) -> Judgment;
}

/// One variant per classifier kind, plus nested pipelines
#[derive(Debug, Clone)]
pub enum ClassifierKind {
    StatusCode(StatusCodeClassifier),
    Error(ErrorClassifier),
    Throttle(ThrottleClassifier),
    EmptyPage(EmptyPageClassifier),
    DifferingDomain(DifferingDomainClassifier),
    PageLength(PageLengthClassifier),
    CosineSimilarity(CosineSimilarityClassifier),
    BlockPage(BlockPageClassifier),
    Pipeline(ClassifyPipeline),
}

impl ClassifierKind {
    /// Slugs accepted as `classifier = "..."` in a pipeline layout
    pub const SLUGS: [&'static str; 8] = [
        status_code::NAME,
        error::NAME,
        throttle::NAME,
        empty_page::NAME,
        differing_domain::NAME,
        page_length::NAME,
        cosine_similarity::NAME,
        block_page::NAME,
    ];

    pub fn is_known_slug(slug: &str) -> bool {
        Self::SLUGS.contains(&slug)
    }

    /// Build the leaf classifier registered under `slug`
    ///
    /// Returns `None` for an unknown slug.
    pub fn from_slug(
        slug: &str,
        thresholds: &Thresholds,
        catalog: &Arc<SignatureCatalog>,
    ) -> Option<Self> {
        let kind = match slug {
            status_code::NAME => Self::StatusCode(StatusCodeClassifier::new()),
            error::NAME => Self::Error(ErrorClassifier::new(
                thresholds.error.clone(),
                Arc::clone(catalog),
            )),
            throttle::NAME => Self::Throttle(ThrottleClassifier::new(thresholds.throttle.clone())),
            empty_page::NAME => {
                Self::EmptyPage(EmptyPageClassifier::new(thresholds.empty_page.clone()))
            }
            differing_domain::NAME => Self::DifferingDomain(DifferingDomainClassifier::new(
                thresholds.differing_domain.clone(),
                Arc::clone(catalog),
            )),
            page_length::NAME => {
                Self::PageLength(PageLengthClassifier::new(thresholds.page_length.clone()))
            }
            cosine_similarity::NAME => Self::CosineSimilarity(CosineSimilarityClassifier::new(
                thresholds.cosine_similarity.clone(),
            )),
            block_page::NAME => Self::BlockPage(BlockPageClassifier::new(
                thresholds.block_page.clone(),
                Arc::clone(catalog),
            )),
            _ => return None,
        };
        Some(kind)
    }

    /// The judgment this member reports when it is not allowed to run
    ///
    /// Leaves abstain directly; a nested pipeline abstains with its whole
    /// subtree so the tree shape stays predictable from the layout.
    pub fn abstention(&self, reason: &str) -> Judgment {
        match self {
            Self::Pipeline(pipeline) => pipeline.abstain_all(reason),
            other => Judgment::abstain(other.name(), reason),
        }
    }
}

impl Classifier for ClassifierKind {
    fn name(&self) -> &str {
        match self {
            Self::StatusCode(c) => c.name(),
            Self::Error(c) => c.name(),
            Self::Throttle(c) => c.name(),
            Self::EmptyPage(c) => c.name(),
            Self::DifferingDomain(c) => c.name(),
            Self::PageLength(c) => c.name(),
            Self::CosineSimilarity(c) => c.name(),
            Self::BlockPage(c) => c.name(),
            Self::Pipeline(c) => c.name(),
        }
    }

    fn classify(&self, evidence: &Evidence) -> Judgment {
        match self {
            Self::StatusCode(c) => c.classify(evidence),
            Self::Error(c) => c.classify(evidence),
            Self::Throttle(c) => c.classify(evidence),
            Self::EmptyPage(c) => c.classify(evidence),
            Self::DifferingDomain(c) => c.classify(evidence),
            Self::PageLength(c) => c.classify(evidence),
            Self::CosineSimilarity(c) => c.classify(evidence),
            Self::BlockPage(c) => c.classify(evidence),
            Self::Pipeline(c) => c.classify(evidence),
        }
    }
}

#[cfg(test)]
mod tests;
