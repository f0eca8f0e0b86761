use crate::error::{self, Error, Result};
use crate::signatures::{BodySignature, CatalogFile, ErrorFingerprint, HeaderSignature};
use regex::{Regex, RegexBuilder};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Compiled regex size cap; keeps user-supplied patterns from exploding
const REGEX_SIZE_LIMIT: usize = 1 << 22;

/// Versioned block page signature catalog
///
/// Patterns are data: the catalog is loaded from TOML and compiled once, so
/// new fingerprints ship without touching classifier code.
///
/// # Example Usage
/// ```
/// use pageverdict::signatures::SignatureCatalog;
///
/// let catalog = SignatureCatalog::default_catalog()?;
/// let hit = catalog.match_body("<p>The URL has been blocked</p>");
/// assert!(hit.is_some());
/// # Ok::<(), pageverdict::Error>(())
/// ```
#[derive(Debug)]
pub struct SignatureCatalog {
    version: String,
    digest: String,
    block_urls: Vec<String>,
    body: Vec<(BodySignature, Regex)>,
    header: Vec<(HeaderSignature, Regex)>,
    error: Vec<ErrorFingerprint>,
    inconclusive: Vec<(BodySignature, Regex)>,
}

impl SignatureCatalog {
    /// Load a catalog from a TOML file
    ///
    /// # Errors
    /// Returns error if the file is unreadable, is not valid TOML, or holds a
    /// pattern that does not compile.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = error::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Catalog compiled into the binary (`signatures-default.toml`)
    pub fn default_catalog() -> Result<Self> {
        const DEFAULT_TOML: &str = include_str!("../../signatures-default.toml");
        Self::from_toml_str(DEFAULT_TOML)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        let digest = hex::encode(Sha256::digest(content.as_bytes()));
        Self::compile(file, digest)
    }

    fn compile(file: CatalogFile, digest: String) -> Result<Self> {
        let body = file
            .body
            .into_iter()
            .map(|sig| compile_pattern(&sig.pattern, sig.literal).map(|re| (sig, re)))
            .collect::<Result<Vec<_>>>()?;
        let header = file
            .header
            .into_iter()
            .map(|sig| compile_pattern(&sig.pattern, sig.literal).map(|re| (sig, re)))
            .collect::<Result<Vec<_>>>()?;
        let inconclusive = file
            .inconclusive
            .into_iter()
            .map(|sig| compile_pattern(&sig.pattern, sig.literal).map(|re| (sig, re)))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            version = %file.version,
            body = body.len(),
            header = header.len(),
            error = file.error.len(),
            "compiled signature catalog"
        );

        Ok(Self {
            version: file.version,
            digest,
            block_urls: file.block_urls,
            body,
            header,
            error: file.error,
            inconclusive,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// SHA-256 of the catalog source, hex encoded
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Number of body and header fingerprints
    pub fn len(&self) -> usize {
        self.body.len() + self.header.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First body fingerprint found anywhere in `content`
    pub fn match_body(&self, content: &str) -> Option<&BodySignature> {
        first_match(&self.body, content)
    }

    /// First header fingerprint matched by any of `headers`
    pub fn match_headers(&self, headers: &[(String, String)]) -> Option<&HeaderSignature> {
        self.header.iter().find_map(|(sig, re)| {
            headers
                .iter()
                .any(|(name, value)| name.eq_ignore_ascii_case(&sig.header) && re.is_match(value))
                .then_some(sig)
        })
    }

    /// First fingerprint marking `content` as unusable evidence
    pub fn match_inconclusive(&self, content: &str) -> Option<&BodySignature> {
        first_match(&self.inconclusive, content)
    }

    /// True when `url` is a known block page address
    pub fn is_block_url(&self, url: &str) -> bool {
        self.block_urls.iter().any(|known| known == url)
    }

    /// Region fingerprint matching the vantage point and first error
    pub fn match_error(
        &self,
        country: Option<&str>,
        asn: Option<u32>,
        first_error: &str,
    ) -> Option<&ErrorFingerprint> {
        self.error
            .iter()
            .find(|fp| fp.matches(country, asn, first_error))
    }
}

fn first_match<'a>(patterns: &'a [(BodySignature, Regex)], content: &str) -> Option<&'a BodySignature> {
    patterns.iter().find_map(|(sig, re)| {
        re.find(content).map(|m| {
            tracing::debug!(pattern = %sig.pattern, matched = m.as_str(), "body signature hit");
            sig
        })
    })
}

fn compile_pattern(pattern: &str, literal: bool) -> Result<Regex> {
    let source = if literal {
        regex::escape(pattern)
    } else {
        pattern.to_string()
    };
    RegexBuilder::new(&source)
        .case_insensitive(true)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}
