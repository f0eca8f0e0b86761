//! pageverdict - offline classifier for captured web page fetches
//!
//! Given one captured fetch of a URL (HTTP Archive, vantage-point details,
//! optionally a baseline fetch from an unfiltered network) this library
//! decides whether the page was inaccessible and how confident it is. A
//! tree of heuristic classifiers each judge one signal; pipelines pool
//! their judgments into a single verdict that keeps every constituent.
//!
//! # Example
//! ```
//! use pageverdict::config::Config;
//! use pageverdict::evidence::Evidence;
//! use pageverdict::pipeline::ClassifyPipeline;
//! use pageverdict::signatures::SignatureCatalog;
//! use pageverdict::classifier::Classifier;
//! use std::sync::Arc;
//!
//! let config = Config::default_config()?;
//! let catalog = Arc::new(SignatureCatalog::default_catalog()?);
//! let pipeline = ClassifyPipeline::from_config(&config, catalog)?;
//!
//! let evidence = Evidence::builder("http://example.com/").status_code(503).build();
//! let verdict = pipeline.classify(&evidence);
//! assert!(verdict.is_down());
//! assert_eq!(verdict.constituents().len(), 8);
//! # Ok::<(), pageverdict::Error>(())
//! ```

pub mod classifier;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod evidence;
pub mod judgment;
pub mod pipeline;
pub mod session;
pub mod signatures;

pub use error::{Error, Result};
