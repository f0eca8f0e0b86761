//! Error types for configuration and session loading
//!
//! Classifiers never return these: missing evidence is an abstention, not an
//! error. Everything here is raised before a pipeline evaluates anything.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building pipelines or loading session documents
#[derive(Error, Debug)]
pub enum Error {
    #[error("pipeline '{0}' has no members")]
    EmptyPipeline(String),

    #[error("pipeline '{0}' is referenced but never defined")]
    UnknownPipeline(String),

    #[error("unknown classifier '{0}'")]
    UnknownClassifier(String),

    #[error("duplicate pipeline name '{0}'")]
    DuplicatePipeline(String),

    #[error("pipeline nesting forms a cycle: {}", .0.join(" -> "))]
    CyclicPipeline(Vec<String>),

    #[error("member {index} of pipeline '{pipeline}' must name exactly one of `classifier` or `pipeline`")]
    AmbiguousMember { pipeline: String, index: usize },

    #[error("member '{member}' of pipeline '{pipeline}' has non-positive weight {weight}")]
    InvalidWeight {
        pipeline: String,
        member: String,
        weight: f64,
    },

    #[error("invalid threshold: {0}")]
    InvalidThreshold(String),

    #[error("invalid signature pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("malformed session document: {0}")]
    MalformedSession(String),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Read a file into a string, tagging failures with the path
pub(crate) fn read_to_string(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}
