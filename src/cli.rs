//! CLI argument parsing for pageverdict

use crate::config::Config;
use crate::pipeline::StatusPolicy;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed verdict document
    Json,
    /// Indented human-readable tree
    Text,
}

#[derive(Parser, Debug)]
#[command(name = "pageverdict")]
#[command(version)]
#[command(about = "Decide whether a captured page fetch was inaccessible", long_about = None)]
pub struct Cli {
    /// Session document (JSON with url, baseline, pageDetail, har); `-` reads stdin
    #[arg(value_name = "SESSION_FILE", required_unless_present = "print_config")]
    pub session: Option<PathBuf>,

    /// Threshold table and pipeline layout (TOML), replacing the built-in one
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Block page signature catalog (TOML), replacing the built-in one
    #[arg(long = "signatures", value_name = "FILE")]
    pub signatures: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Evaluate every pipeline member in order on one thread
    #[arg(long = "sequential")]
    pub sequential: bool,

    /// Report the root status from pooled confidence instead of pinning it to Down
    #[arg(long = "derive-status")]
    pub derive_status: bool,

    /// Wall-clock budget per pipeline in milliseconds
    #[arg(long = "timeout-ms", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// Print the effective configuration and exit
    #[arg(long = "print-config")]
    pub print_config: bool,

    /// Enable debug tracing output to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Apply command-line overrides to a loaded configuration
    ///
    /// Returns true when anything changed, so the caller can refresh the
    /// configuration digest.
    pub fn apply_overrides(&self, config: &mut Config) -> bool {
        let mut changed = false;
        if self.sequential {
            for pipeline in &mut config.layout.pipelines {
                pipeline.parallel = false;
            }
            changed = true;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            for pipeline in &mut config.layout.pipelines {
                pipeline.timeout_ms = timeout_ms;
            }
            changed = true;
        }
        if self.derive_status {
            let root = config.layout.root.clone();
            if let Some(pipeline) = config.layout.pipelines.iter_mut().find(|p| p.name == root) {
                pipeline.status = StatusPolicy::Threshold;
                changed = true;
            }
        }
        changed
    }

    /// True when the session should be read from stdin
    pub fn session_from_stdin(&self) -> bool {
        self.session.as_deref().is_some_and(|p| p.as_os_str() == "-")
    }
}
