// Block page signature classifier
//
// Scans response headers and then the page body against the signature
// catalog. Any hit is strong evidence of a censor-served page, so the
// judgment is Down at the configured confidence and marked blocked.
//
// Header fingerprints are mostly `Location` headers on redirect hops, so
// every captured response of the page is scanned. A hit only counts when
// that response came from the requested or the landing site.

use super::Classifier;
use crate::config::BlockPageThresholds;
use crate::domain::registrable_domain;
use crate::evidence::Evidence;
use crate::judgment::Judgment;
use crate::signatures::{HeaderSignature, SignatureCatalog};
use std::sync::Arc;
use tracing::{debug, warn};

pub(crate) const NAME: &str = "block_page";

#[derive(Debug, Clone)]
pub struct BlockPageClassifier {
    confidence: f64,
    catalog: Arc<SignatureCatalog>,
}

impl BlockPageClassifier {
    pub fn new(thresholds: BlockPageThresholds, catalog: Arc<SignatureCatalog>) -> Self {
        Self {
            confidence: thresholds.confidence,
            catalog,
        }
    }

    fn exchange_match<'a>(
        &'a self,
        evidence: &'a Evidence,
    ) -> Option<(&'a str, &'a HeaderSignature)> {
        let requested = registrable_domain(evidence.requested_url());
        let landed = evidence
            .final_url()
            .and_then(registrable_domain)
            .or_else(|| requested.clone());

        for exchange in evidence.exchanges() {
            let Some(signature) = self.catalog.match_headers(&exchange.headers) else {
                continue;
            };
            let site = registrable_domain(&exchange.url);
            if site.is_some() && (site == requested || site == landed) {
                return Some((exchange.url.as_str(), signature));
            }
            warn!(
                url = %exchange.url,
                requested = requested.as_deref().unwrap_or("-"),
                header = %signature.header,
                "block page header from an unrelated site, ignored"
            );
        }
        None
    }
}

impl Classifier for BlockPageClassifier {
    fn name(&self) -> &str {
        NAME
    }

    fn classify(&self, evidence: &Evidence) -> Judgment {
        if let Some(signature) = self.catalog.match_headers(evidence.response_headers()) {
            debug!(header = %signature.header, pattern = %signature.pattern, "block page header");
            return Judgment::down(NAME, self.confidence).blocked();
        }
        if let Some((url, signature)) = self.exchange_match(evidence) {
            debug!(
                url,
                header = %signature.header,
                pattern = %signature.pattern,
                "block page header on captured response"
            );
            return Judgment::down(NAME, self.confidence).blocked();
        }

        let Some(content) = evidence.content().filter(|c| !c.is_empty()) else {
            return Judgment::abstain(NAME, "no content to scan");
        };
        match self.catalog.match_body(content) {
            Some(signature) => {
                debug!(
                    region = signature.region.as_deref().unwrap_or("-"),
                    "block page body"
                );
                Judgment::down(NAME, self.confidence).blocked()
            }
            None => Judgment::up(NAME),
        }
    }
}
