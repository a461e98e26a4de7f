//! Pre-retrieval safety gate.
//!
//! Every question is classified before any content lookup. Banned requests
//! (diagnosis, dosing, triage, image interpretation) and emergency red flags
//! short-circuit the pipeline with fixed copy; only `Answerable` questions
//! reach retrieval.

pub mod keywords;
pub mod messages;

use keywords::{BANNED_KEYWORDS, EMERGENCY_KEYWORDS};

/// Outcome of classifying a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Prohibited clinical-action request. Refuse.
    Banned,
    /// Emergency red flag. Escalate to emergency guidance.
    Escalation,
    /// Safe to retrieve and answer.
    Answerable,
}

/// Pluggable classifier seam. The keyword list is one conforming
/// implementation; a model-based classifier can replace it without
/// touching callers.
pub trait SafetyClassifier: Send + Sync {
    fn classify(&self, question: &str) -> Classification;
}

/// Substring-matching classifier over the fixed keyword lists.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl SafetyClassifier for KeywordClassifier {
    fn classify(&self, question: &str) -> Classification {
        let lower = question.to_lowercase();

        // Banned is checked strictly first: a question matching both lists
        // is refused rather than escalated.
        if BANNED_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            return Classification::Banned;
        }
        if EMERGENCY_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            return Classification::Escalation;
        }
        Classification::Answerable
    }
}
