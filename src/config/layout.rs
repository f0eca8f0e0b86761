// Pipeline layout: which classifiers run, how they nest, how they pool

use crate::classifier::ClassifierKind;
use crate::error::{Error, Result};
use crate::pipeline::{Pooling, StatusPolicy};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

fn default_weight() -> f64 {
    1.0
}

fn default_down_threshold() -> f64 {
    0.5
}

fn default_timeout_ms() -> u64 {
    5_000
}

fn default_parallel() -> bool {
    true
}

/// One member of a pipeline: a leaf classifier or a nested pipeline
///
/// # Example TOML
/// ```toml
/// members = [
///     { classifier = "status_code" },
///     { pipeline = "content", weight = 2.0 },
/// ]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemberDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<String>,

    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl MemberDefinition {
    pub fn classifier(slug: impl Into<String>) -> Self {
        Self {
            classifier: Some(slug.into()),
            pipeline: None,
            weight: default_weight(),
        }
    }

    pub fn pipeline(name: impl Into<String>) -> Self {
        Self {
            classifier: None,
            pipeline: Some(name.into()),
            weight: default_weight(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Display label used in error messages
    pub fn label(&self) -> &str {
        self.classifier
            .as_deref()
            .or(self.pipeline.as_deref())
            .unwrap_or("<unnamed>")
    }
}

/// A named pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineDefinition {
    pub name: String,

    pub members: Vec<MemberDefinition>,

    #[serde(default)]
    pub pooling: Pooling,

    #[serde(default)]
    pub status: StatusPolicy,

    /// Pooled confidence at which a `threshold` pipeline reports Down
    #[serde(default = "default_down_threshold")]
    pub down_threshold: f64,

    /// Wall-clock budget for all members when running in parallel
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl PipelineDefinition {
    pub fn new(name: impl Into<String>, members: Vec<MemberDefinition>) -> Self {
        Self {
            name: name.into(),
            members,
            pooling: Pooling::default(),
            status: StatusPolicy::default(),
            down_threshold: default_down_threshold(),
            timeout_ms: default_timeout_ms(),
            parallel: default_parallel(),
        }
    }
}

/// Named pipelines plus the root to evaluate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineLayout {
    pub root: String,

    #[serde(rename = "pipeline")]
    pub pipelines: Vec<PipelineDefinition>,
}

impl PipelineLayout {
    pub fn get(&self, name: &str) -> Option<&PipelineDefinition> {
        self.pipelines.iter().find(|p| p.name == name)
    }

    /// Reject anything that cannot be built into an acyclic pipeline tree
    ///
    /// # Errors
    /// Duplicate names, unknown references, members naming zero or two
    /// targets, non-positive weights, empty pipelines, and cycles.
    pub fn validate(&self) -> Result<()> {
        let mut by_name: HashMap<&str, &PipelineDefinition> = HashMap::new();
        for pipeline in &self.pipelines {
            if by_name.insert(pipeline.name.as_str(), pipeline).is_some() {
                return Err(Error::DuplicatePipeline(pipeline.name.clone()));
            }
        }

        for pipeline in &self.pipelines {
            if pipeline.members.is_empty() {
                return Err(Error::EmptyPipeline(pipeline.name.clone()));
            }
            if !(0.0..=1.0).contains(&pipeline.down_threshold) {
                return Err(Error::InvalidThreshold(format!(
                    "down_threshold of pipeline '{}' must be in [0, 1], got {}",
                    pipeline.name, pipeline.down_threshold
                )));
            }
            for (index, member) in pipeline.members.iter().enumerate() {
                match (&member.classifier, &member.pipeline) {
                    (Some(slug), None) => {
                        if !ClassifierKind::is_known_slug(slug) {
                            return Err(Error::UnknownClassifier(slug.clone()));
                        }
                    }
                    (None, Some(name)) => {
                        if !by_name.contains_key(name.as_str()) {
                            return Err(Error::UnknownPipeline(name.clone()));
                        }
                    }
                    _ => {
                        return Err(Error::AmbiguousMember {
                            pipeline: pipeline.name.clone(),
                            index,
                        })
                    }
                }
                if !(member.weight > 0.0 && member.weight.is_finite()) {
                    return Err(Error::InvalidWeight {
                        pipeline: pipeline.name.clone(),
                        member: member.label().to_string(),
                        weight: member.weight,
                    });
                }
            }
        }

        if !by_name.contains_key(self.root.as_str()) {
            return Err(Error::UnknownPipeline(self.root.clone()));
        }

        let mut done = HashSet::new();
        for pipeline in &self.pipelines {
            let mut stack = Vec::new();
            Self::visit(&by_name, &pipeline.name, &mut stack, &mut done)?;
        }
        Ok(())
    }

    /// Depth-first walk; `stack` holds the current nesting path
    fn visit<'a>(
        by_name: &HashMap<&'a str, &'a PipelineDefinition>,
        name: &'a str,
        stack: &mut Vec<&'a str>,
        done: &mut HashSet<&'a str>,
    ) -> Result<()> {
        if done.contains(name) {
            return Ok(());
        }
        if let Some(start) = stack.iter().position(|n| *n == name) {
            let mut cycle: Vec<String> = stack[start..].iter().map(|s| s.to_string()).collect();
            cycle.push(name.to_string());
            return Err(Error::CyclicPipeline(cycle));
        }
        let Some(&pipeline) = by_name.get(name) else {
            return Err(Error::UnknownPipeline(name.to_string()));
        };
        stack.push(name);
        for child in pipeline.members.iter().filter_map(|m| m.pipeline.as_deref()) {
            Self::visit(by_name, child, stack, done)?;
        }
        stack.pop();
        done.insert(name);
        Ok(())
    }
}
