// Inconclusive-session screening
//
// Some captures say nothing about the page: a CDN bot challenge, a
// vantage point that could not reach the network at all, or a domain
// seizure notice. Those sessions get an abstained tree instead of a
// verdict.

use crate::evidence::Evidence;
use crate::signatures::SignatureCatalog;
use std::fmt;

/// Error prefixes emitted when the vantage point itself failed
const VANTAGE_TIMEOUT_PREFIXES: &[&str] = &[
    "(28, 'Resolving timed out",
    "(28, 'Operation timed out",
    "(28, 'Connection timed out",
    "(7, 'Failed to connect",
];

/// Why a session cannot be judged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconclusive {
    CaptchaChallenge { vendor: &'static str },
    VantageTimeout { error: String },
    SeizedDomain,
}

impl fmt::Display for Inconclusive {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Inconclusive::CaptchaChallenge { vendor } => {
                write!(f, "inconclusive: {} captcha challenge", vendor)
            }
            Inconclusive::VantageTimeout { error } => {
                write!(f, "inconclusive: vantage point timeout ({})", error)
            }
            Inconclusive::SeizedDomain => write!(f, "inconclusive: seized domain notice"),
        }
    }
}

/// Screen a session; `None` means it can be classified
pub fn screen(evidence: &Evidence, catalog: &SignatureCatalog) -> Option<Inconclusive> {
    captcha_vendor(evidence)
        .map(|vendor| Inconclusive::CaptchaChallenge { vendor })
        .or_else(|| {
            evidence
                .errors()
                .iter()
                .find(|e| VANTAGE_TIMEOUT_PREFIXES.iter().any(|p| e.starts_with(p)))
                .map(|e| Inconclusive::VantageTimeout { error: e.clone() })
        })
        .or_else(|| {
            evidence
                .content()
                .and_then(|c| catalog.match_inconclusive(c))
                .map(|_| Inconclusive::SeizedDomain)
        })
}

fn captcha_vendor(evidence: &Evidence) -> Option<&'static str> {
    if evidence.status_code() != Some(403) {
        return None;
    }
    evidence
        .response_headers()
        .iter()
        .find_map(|(name, value)| {
            if name.eq_ignore_ascii_case("set-cookie")
                && value.to_ascii_lowercase().starts_with("incap_ses_")
            {
                Some("Incapsula")
            } else if name.eq_ignore_ascii_case("server") {
                match value.as_str() {
                    "cloudflare-nginx" => Some("Cloudflare"),
                    "AkamaiGHost" => Some("Akamai"),
                    _ => None,
                }
            } else {
                None
            }
        })
}
