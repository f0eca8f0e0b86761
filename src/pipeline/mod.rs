//! Composite classification pipeline
//!
//! A [`ClassifyPipeline`] owns an ordered, immutable list of members, each a
//! leaf classifier or another pipeline. Evaluation runs every member against
//! the same evidence, keeps their judgments as constituents in configured
//! order, and pools the conclusive ones into the pipeline's own judgment.
//!
//! Post-processing: a pipeline that resolves Down is marked blocked when
//! any constituent is blocked.
//!
//! # Example
//! ```
//! use pageverdict::classifier::{Classifier, ClassifierKind, StatusCodeClassifier};
//! use pageverdict::evidence::Evidence;
//! use pageverdict::pipeline::{ClassifyPipeline, StatusPolicy};
//!
//! let pipeline = ClassifyPipeline::builder("smoke")
//!     .member(ClassifierKind::StatusCode(StatusCodeClassifier::new()))
//!     .status_policy(StatusPolicy::Threshold)
//!     .build()?;
//!
//! let evidence = Evidence::builder("http://example.com/").status_code(200).build();
//! let judgment = pipeline.classify(&evidence);
//! assert!(!judgment.is_down());
//! assert_eq!(judgment.constituents().len(), 1);
//! # Ok::<(), pageverdict::Error>(())
//! ```

mod dispatch;
mod pooling;

pub use pooling::{Pooling, Scored, StatusPolicy};

use crate::classifier::{Classifier, ClassifierKind};
use crate::config::{Config, PipelineLayout, Thresholds};
use crate::error::{Error, Result};
use crate::evidence::Evidence;
use crate::judgment::{Judgment, Status};
use crate::signatures::SignatureCatalog;
use dispatch::Task;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5_000);

#[derive(Debug)]
struct Member {
    classifier: ClassifierKind,
    weight: f64,
}

impl Task for Member {
    fn label(&self) -> &str {
        self.classifier.name()
    }

    fn run(&self, evidence: &Evidence) -> Judgment {
        self.classifier.classify(evidence)
    }

    fn abstain(&self, reason: &str) -> Judgment {
        self.classifier.abstention(reason)
    }
}

/// Composite classifier pooling its members' judgments
#[derive(Debug, Clone)]
pub struct ClassifyPipeline {
    name: String,
    members: Arc<[Member]>,
    pooling: Pooling,
    status: StatusPolicy,
    down_threshold: f64,
    timeout: Duration,
    parallel: bool,
}

impl ClassifyPipeline {
    pub fn builder(name: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder::new(name)
    }

    /// Build the root pipeline of a validated configuration
    pub fn from_config(config: &Config, catalog: Arc<SignatureCatalog>) -> Result<Self> {
        Self::from_layout(&config.layout, &config.thresholds, catalog)
    }

    /// Build the tree rooted at `layout.root`
    ///
    /// # Errors
    /// Any layout problem [`PipelineLayout::validate`] reports, including
    /// cycles, is returned before a single classifier is constructed.
    pub fn from_layout(
        layout: &PipelineLayout,
        thresholds: &Thresholds,
        catalog: Arc<SignatureCatalog>,
    ) -> Result<Self> {
        layout.validate()?;
        thresholds.validate()?;
        Self::build_named(layout, &layout.root, thresholds, &catalog)
    }

    fn build_named(
        layout: &PipelineLayout,
        name: &str,
        thresholds: &Thresholds,
        catalog: &Arc<SignatureCatalog>,
    ) -> Result<Self> {
        let definition = layout
            .get(name)
            .ok_or_else(|| Error::UnknownPipeline(name.to_string()))?;

        let mut builder = Self::builder(&definition.name)
            .pooling(definition.pooling)
            .status_policy(definition.status)
            .down_threshold(definition.down_threshold)
            .timeout(Duration::from_millis(definition.timeout_ms))
            .parallel(definition.parallel);

        for (index, member) in definition.members.iter().enumerate() {
            let classifier = match (&member.classifier, &member.pipeline) {
                (Some(slug), None) => ClassifierKind::from_slug(slug, thresholds, catalog)
                    .ok_or_else(|| Error::UnknownClassifier(slug.clone()))?,
                (None, Some(child)) => ClassifierKind::Pipeline(Self::build_named(
                    layout, child, thresholds, catalog,
                )?),
                _ => {
                    return Err(Error::AmbiguousMember {
                        pipeline: definition.name.clone(),
                        index,
                    })
                }
            };
            builder = builder.weighted_member(classifier, member.weight);
        }
        builder.build()
    }

    pub fn pooling(&self) -> Pooling {
        self.pooling
    }

    pub fn status_policy(&self) -> StatusPolicy {
        self.status
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of configured members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false: construction rejects empty pipelines
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member names in configured order
    pub fn member_names(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.classifier.name()).collect()
    }

    /// Judgment tree for a session that must not be judged
    ///
    /// Every member, nested pipelines included, abstains with `reason`.
    pub fn abstain_all(&self, reason: &str) -> Judgment {
        let constituents = self
            .members
            .iter()
            .map(|m| m.classifier.abstention(reason))
            .collect();
        Judgment::abstain(&self.name, reason).with_constituents(constituents)
    }

    fn pool(&self, constituents: Vec<Judgment>) -> Judgment {
        let scored: Vec<Scored> = self
            .members
            .iter()
            .zip(&constituents)
            .filter(|(_, judgment)| !judgment.is_abstained())
            .map(|(member, judgment)| Scored {
                status: judgment.status(),
                confidence: judgment.confidence(),
                weight: member.weight,
            })
            .collect();

        if scored.is_empty() {
            debug!(pipeline = %self.name, "every constituent abstained");
            return Judgment::abstain(&self.name, "all constituents abstained")
                .with_constituents(constituents);
        }

        let confidence = self.pooling.pool(&scored);
        let status = self.status.resolve(confidence, self.down_threshold);
        let blocked = status == Status::Down && constituents.iter().any(Judgment::is_blocked);
        debug!(
            pipeline = %self.name,
            conclusive = scored.len(),
            confidence,
            status = status.as_str(),
            blocked,
            "pooled"
        );

        let judgment = Judgment::new(status, confidence, &self.name).with_constituents(constituents);
        if blocked {
            judgment.blocked()
        } else {
            judgment
        }
    }
}

impl Classifier for ClassifyPipeline {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, evidence: &Evidence) -> Judgment {
        let constituents = if self.parallel && self.members.len() > 1 {
            dispatch::parallel(&self.name, &self.members, evidence, self.timeout)
        } else {
            dispatch::sequential(&self.members[..], evidence)
        };
        self.pool(constituents)
    }
}

/// Programmatic pipeline construction
#[derive(Debug)]
pub struct PipelineBuilder {
    name: String,
    members: Vec<Member>,
    pooling: Pooling,
    status: StatusPolicy,
    down_threshold: f64,
    timeout: Duration,
    parallel: bool,
}

impl PipelineBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            pooling: Pooling::default(),
            status: StatusPolicy::default(),
            down_threshold: 0.5,
            timeout: DEFAULT_TIMEOUT,
            parallel: true,
        }
    }

    /// Add a member with weight 1.0
    pub fn member(self, classifier: ClassifierKind) -> Self {
        self.weighted_member(classifier, 1.0)
    }

    pub fn weighted_member(mut self, classifier: ClassifierKind, weight: f64) -> Self {
        self.members.push(Member { classifier, weight });
        self
    }

    pub fn pooling(mut self, pooling: Pooling) -> Self {
        self.pooling = pooling;
        self
    }

    pub fn status_policy(mut self, status: StatusPolicy) -> Self {
        self.status = status;
        self
    }

    pub fn down_threshold(mut self, down_threshold: f64) -> Self {
        self.down_threshold = down_threshold;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn build(self) -> Result<ClassifyPipeline> {
        if self.members.is_empty() {
            return Err(Error::EmptyPipeline(self.name));
        }
        if !(0.0..=1.0).contains(&self.down_threshold) {
            return Err(Error::InvalidThreshold(format!(
                "down_threshold of pipeline '{}' must be in [0, 1], got {}",
                self.name, self.down_threshold
            )));
        }
        if let Some(member) = self
            .members
            .iter()
            .find(|m| !(m.weight > 0.0 && m.weight.is_finite()))
        {
            return Err(Error::InvalidWeight {
                pipeline: self.name.clone(),
                member: member.classifier.name().to_string(),
                weight: member.weight,
            });
        }
        Ok(ClassifyPipeline {
            name: self.name,
            members: self.members.into(),
            pooling: self.pooling,
            status: self.status,
            down_threshold: self.down_threshold,
            timeout: self.timeout,
            parallel: self.parallel,
        })
    }
}
