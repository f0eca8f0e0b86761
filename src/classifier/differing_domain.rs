// Differing domain classifier: did the fetch land on someone else's site?
//
// Compares registrable domains of the requested and final URLs. Domains in
// one configured equivalence group, or sharing an organization label under
// different suffixes (example.com / example.co.uk), count as the same site.
// Landing on a catalogued block page URL is conclusive and marks blocking.

use super::Classifier;
use crate::config::DifferingDomainThresholds;
use crate::domain::{self, organization_label, registrable_domain};
use crate::evidence::Evidence;
use crate::judgment::Judgment;
use crate::signatures::SignatureCatalog;
use std::sync::Arc;
use tracing::debug;

pub(crate) const NAME: &str = "differing_domain";

#[derive(Debug, Clone)]
pub struct DifferingDomainClassifier {
    confidence: f64,
    /// Lower-cased registrable domains
    groups: Vec<Vec<String>>,
    catalog: Arc<SignatureCatalog>,
}

impl DifferingDomainClassifier {
    pub fn new(thresholds: DifferingDomainThresholds, catalog: Arc<SignatureCatalog>) -> Self {
        let groups = thresholds
            .equivalent_domains
            .iter()
            .map(|group| group.iter().map(|d| d.trim().to_ascii_lowercase()).collect())
            .collect();
        Self {
            confidence: thresholds.confidence,
            groups,
            catalog,
        }
    }

    fn equivalent(&self, requested: &str, landed: &str, both_named: bool) -> bool {
        if requested == landed {
            return true;
        }
        if both_named {
            let labels = (organization_label(requested), organization_label(landed));
            if let (Some(a), Some(b)) = labels {
                if a == b {
                    return true;
                }
            }
        }
        self.groups.iter().any(|group| {
            group.iter().any(|d| d == requested) && group.iter().any(|d| d == landed)
        })
    }
}

impl Classifier for DifferingDomainClassifier {
    fn name(&self) -> &str {
        NAME
    }

    fn classify(&self, evidence: &Evidence) -> Judgment {
        let Some(final_url) = evidence.final_url() else {
            return Judgment::abstain(NAME, "no final URL recorded");
        };
        if self.catalog.is_block_url(final_url) {
            debug!(final_url, "landed on a known block page");
            return Judgment::down(NAME, 1.0).blocked();
        }

        let requested_url = evidence.requested_url();
        let (Some(requested), Some(landed)) =
            (registrable_domain(requested_url), registrable_domain(final_url))
        else {
            return Judgment::abstain(NAME, "URL has no usable host");
        };

        let both_named = !domain::is_ip(requested_url) && !domain::is_ip(final_url);
        if self.equivalent(&requested, &landed, both_named) {
            return Judgment::up(NAME);
        }
        debug!(%requested, %landed, "registrable domains differ");
        Judgment::down(NAME, self.confidence)
    }
}
