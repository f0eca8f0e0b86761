// Classification configuration
//
// A single TOML document carries the threshold table and the pipeline
// layout. The shipped default is embedded from pipeline-default.toml; the
// --config flag replaces it. Every table is versioned and the SHA-256 of
// its source is kept so a verdict can be traced to the table that produced
// it.

mod layout;
mod thresholds;

pub use layout::{MemberDefinition, PipelineDefinition, PipelineLayout};
pub use thresholds::{
    BlockPageThresholds, CosineThresholds, DifferingDomainThresholds, EmptyPageThresholds,
    ErrorThresholds, PageLengthThresholds, ThrottleThresholds, Thresholds,
};

use crate::error::{self, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Thresholds plus pipeline layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub version: String,

    #[serde(flatten)]
    pub layout: PipelineLayout,

    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(skip)]
    digest: String,
}

impl Config {
    /// Load and validate a configuration file
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = error::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Configuration compiled into the binary (`pipeline-default.toml`)
    pub fn default_config() -> Result<Self> {
        const DEFAULT_TOML: &str = include_str!("../../pipeline-default.toml");
        Self::from_toml_str(DEFAULT_TOML)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.digest = hex::encode(Sha256::digest(content.as_bytes()));
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration in code; the digest covers its TOML rendering
    pub fn new(version: impl Into<String>, thresholds: Thresholds, layout: PipelineLayout) -> Result<Self> {
        let mut config = Self {
            version: version.into(),
            layout,
            thresholds,
            digest: String::new(),
        };
        config.refresh_digest();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        self.layout.validate()
    }

    /// SHA-256 of the configuration source, hex encoded
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Recompute the digest after in-place edits (CLI overrides)
    pub fn refresh_digest(&mut self) {
        let rendered = toml::to_string(self).unwrap_or_default();
        self.digest = hex::encode(Sha256::digest(rendered.as_bytes()));
    }

    /// Render as TOML (for `--print-config`)
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
