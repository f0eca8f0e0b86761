//! Judgment tree and its output document
//!
//! A [`Judgment`] is produced bottom-up by one evaluation and is immutable
//! afterwards. Leaf classifiers produce nodes without constituents; a
//! pipeline produces one node whose constituents mirror its configured
//! members, abstentions included.

use serde::{Deserialize, Serialize};

/// Reachability call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Up,
    Down,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Up => "up",
            Status::Down => "down",
        }
    }
}

/// One node of the verdict tree
#[derive(Debug, Clone, PartialEq)]
pub struct Judgment {
    status: Status,
    confidence: f64,
    classifier: String,
    constituents: Vec<Judgment>,
    abstention: Option<String>,
    blocked: bool,
}

impl Judgment {
    /// Evidence found no inaccessibility
    pub fn up(classifier: impl Into<String>) -> Self {
        Self::new(Status::Up, 0.0, classifier)
    }

    /// Inaccessible with `confidence`, clamped to [0, 1]
    pub fn down(classifier: impl Into<String>, confidence: f64) -> Self {
        Self::new(Status::Down, confidence, classifier)
    }

    /// No opinion: Up, confidence 0.0, tagged with why
    pub fn abstain(classifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            abstention: Some(reason.into()),
            ..Self::new(Status::Up, 0.0, classifier)
        }
    }

    pub(crate) fn new(status: Status, confidence: f64, classifier: impl Into<String>) -> Self {
        Self {
            status,
            confidence: clamp_confidence(confidence),
            classifier: classifier.into(),
            constituents: Vec::new(),
            abstention: None,
            blocked: false,
        }
    }

    /// Mark as deliberate blocking
    pub fn blocked(mut self) -> Self {
        self.blocked = true;
        self
    }

    pub(crate) fn with_constituents(mut self, constituents: Vec<Judgment>) -> Self {
        self.constituents = constituents;
        self
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn classifier(&self) -> &str {
        &self.classifier
    }

    pub fn constituents(&self) -> &[Judgment] {
        &self.constituents
    }

    pub fn is_abstained(&self) -> bool {
        self.abstention.is_some()
    }

    pub fn abstention_reason(&self) -> Option<&str> {
        self.abstention.as_deref()
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn is_down(&self) -> bool {
        self.status == Status::Down
    }

    /// First constituent produced by `classifier`, searching one level down
    pub fn constituent(&self, classifier: &str) -> Option<&Judgment> {
        self.constituents.iter().find(|c| c.classifier == classifier)
    }

    /// Map to the serializable output document
    pub fn to_document(&self) -> JudgmentDocument {
        JudgmentDocument {
            status: self.status,
            status_confidence: self.confidence,
            classifier: self.classifier.clone(),
            abstained: self.is_abstained(),
            reason: self.abstention.clone(),
            blocked: self.blocked,
            constituents: self.constituents.iter().map(Judgment::to_document).collect(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.to_document())
    }

    /// Indented human-readable tree
    pub fn to_report_string(&self) -> String {
        let mut report = String::new();
        self.write_report(&mut report, 0);
        report
    }

    fn write_report(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let marker = match (self.status, self.blocked) {
            (_, _) if self.is_abstained() => "·",
            (Status::Down, true) => "⛔",
            (Status::Down, false) => "❌",
            (Status::Up, _) => "✅",
        };
        out.push_str(&format!(
            "{}{} {} {} ({:.3})",
            indent,
            marker,
            self.classifier,
            self.status.as_str().to_uppercase(),
            self.confidence
        ));
        if let Some(reason) = &self.abstention {
            out.push_str(&format!(" - abstained: {}", reason));
        }
        if self.blocked {
            out.push_str(" - blocked");
        }
        out.push('\n');
        for child in &self.constituents {
            child.write_report(out, depth + 1);
        }
    }
}

fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Output document shape
///
/// ```json
/// { "status": "down", "statusConfidence": 0.5, "classifier": "pipeline",
///   "constituents": [ ... ] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgmentDocument {
    pub status: Status,
    pub status_confidence: f64,
    pub classifier: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub abstained: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub blocked: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constituents: Vec<JudgmentDocument>,
}
