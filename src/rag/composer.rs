//! Deterministic answer composer.
//!
//! Retrieved chunks are templated into a bulleted answer with citations and
//! the product disclaimer. Nothing here is generative: the same chunks
//! always produce the same text.

use crate::safety::messages::{
    ESCALATION_RED_FLAGS, MEDICAL_DISCLAIMER, NOT_IN_RECORDS, REFUSAL_BANNED,
};

use super::types::{ChatAnswer, Citation, RetrievedChunk, SafetyTag};

/// At most this many chunks are quoted in an answer, regardless of how many
/// retrieval returned.
pub const MAX_ANSWER_CHUNKS: usize = 3;

/// Compose an answer from ranked chunks. An empty slice yields the
/// data-absence refusal with no citations.
pub fn compose(chunks: &[RetrievedChunk]) -> ChatAnswer {
    if chunks.is_empty() {
        return ChatAnswer {
            answer: NOT_IN_RECORDS.to_string(),
            citations: Vec::new(),
            safety_tag: SafetyTag::Refusal,
        };
    }

    let cited = &chunks[..chunks.len().min(MAX_ANSWER_CHUNKS)];

    let mut answer = String::from("Here's what I found in your records:\n\n");
    for chunk in cited {
        answer.push_str("• ");
        answer.push_str(&chunk.text);
        answer.push('\n');
    }
    answer.push('\n');
    answer.push_str(MEDICAL_DISCLAIMER);

    let citations = cited
        .iter()
        .map(|chunk| Citation {
            document_id: chunk.document_id,
            source_anchor: chunk.source_anchor.clone(),
        })
        .collect();

    ChatAnswer {
        answer,
        citations,
        safety_tag: SafetyTag::Ok,
    }
}

/// Fixed refusal for banned questions.
pub fn refusal_banned() -> ChatAnswer {
    ChatAnswer {
        answer: REFUSAL_BANNED.to_string(),
        citations: Vec::new(),
        safety_tag: SafetyTag::Refusal,
    }
}

/// Fixed escalation guidance for red-flag questions.
pub fn escalation() -> ChatAnswer {
    ChatAnswer {
        answer: ESCALATION_RED_FLAGS.to_string(),
        citations: Vec::new(),
        safety_tag: SafetyTag::Escalation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn chunk(text: &str, anchor: Option<&str>) -> RetrievedChunk {
        RetrievedChunk {
            document_id: Uuid::new_v4(),
            source_anchor: anchor.map(String::from),
            text: text.into(),
        }
    }

    #[test]
    fn empty_retrieval_refuses_without_citations() {
        let answer = compose(&[]);
        assert_eq!(answer.answer, NOT_IN_RECORDS);
        assert!(answer.citations.is_empty());
        assert_eq!(answer.safety_tag, SafetyTag::Refusal);
    }

    #[test]
    fn composes_bullets_with_disclaimer() {
        let answer = compose(&[chunk("Hemoglobin 12.9 g/dL (ref 12.0-16.0)", Some("p1.l4"))]);
        assert!(answer.answer.starts_with("Here's what I found in your records:"));
        assert!(answer.answer.contains("• Hemoglobin 12.9 g/dL (ref 12.0-16.0)"));
        assert!(answer.answer.ends_with(MEDICAL_DISCLAIMER));
        assert_eq!(answer.safety_tag, SafetyTag::Ok);
        assert_eq!(answer.citations.len(), 1);
        assert_eq!(answer.citations[0].source_anchor.as_deref(), Some("p1.l4"));
    }

    #[test]
    fn caps_at_three_chunks() {
        let chunks: Vec<_> = (0..5).map(|i| chunk(&format!("chunk {i}"), None)).collect();
        let answer = compose(&chunks);
        assert_eq!(answer.citations.len(), 3);
        assert!(answer.answer.contains("chunk 2"));
        assert!(!answer.answer.contains("chunk 3"));
    }

    #[test]
    fn citations_track_cited_chunks() {
        let a = chunk("first", Some("p1.c0"));
        let b = chunk("second", None);
        let answer = compose(&[a.clone(), b.clone()]);
        assert_eq!(answer.citations.len(), 2);
        assert_eq!(answer.citations[0].document_id, a.document_id);
        assert_eq!(answer.citations[1].document_id, b.document_id);
        assert_eq!(answer.citations[1].source_anchor, None);
    }

    #[test]
    fn fixed_answers_carry_their_tags() {
        assert_eq!(refusal_banned().safety_tag, SafetyTag::Refusal);
        assert_eq!(refusal_banned().answer, REFUSAL_BANNED);
        assert_eq!(escalation().safety_tag, SafetyTag::Escalation);
        assert_eq!(escalation().answer, ESCALATION_RED_FLAGS);
    }

    #[test]
    fn same_input_same_output() {
        let chunks = vec![chunk("stable text", Some("p2.c1"))];
        assert_eq!(compose(&chunks).answer, compose(&chunks).answer);
    }
}
