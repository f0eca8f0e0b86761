// TOML-Based Block Page Signatures
//
// Fingerprints of national block pages, block-page redirects and
// vantage-point-specific resets, loaded as data. Adding a fingerprint means
// editing a TOML table, never a classifier.
//
// The default catalog is embedded from signatures-default.toml; a replacement
// can be supplied at runtime with --signatures.

mod catalog;
mod definition;

pub use catalog::SignatureCatalog;
pub use definition::{BodySignature, CatalogFile, ErrorFingerprint, HeaderSignature};
