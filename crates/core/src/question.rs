use serde::{Deserialize, Serialize};

/// Where a dispatched question came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionSource {
    /// Static topic catalog shipped with the binary.
    Local,
    /// Counter-question selected from a keyword in the previous answer.
    Adaptive,
    /// Produced by the resume question generator (or its fallback).
    ResumeGenerated,
    /// The single guaranteed wrap-up question.
    Checkout,
}

/// A question the orchestrator has decided to ask.
///
/// `id` is the normalized question text; the session guarantees no `id`
/// is ever dispatched twice.
#[derive(Debug, Clone)]
pub struct QuestionRecord {
    pub id: String,
    pub text: String,
    pub expected_answer: String,
    pub topic: String,
    pub source: QuestionSource,
}

impl QuestionRecord {
    pub fn new(
        text: impl Into<String>,
        expected_answer: impl Into<String>,
        topic: impl Into<String>,
        source: QuestionSource,
    ) -> Self {
        let text = text.into();
        Self {
            id: normalize_id(&text),
            text,
            expected_answer: expected_answer.into(),
            topic: topic.into(),
            source,
        }
    }
}

/// One scored question/answer exchange, appended to the report card by
/// the scoring worker. Immutable once created.
#[derive(Debug, Clone)]
pub struct ScoreEntry {
    pub topic: String,
    pub question: String,
    pub answer: String,
    pub expected: String,
    pub score: u8,
    pub source: QuestionSource,
}

/// Question identity: lowercase, punctuation stripped, whitespace
/// collapsed. Used for the asked-id set and bank de-duplication.
pub fn normalize_id(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
