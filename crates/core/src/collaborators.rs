//! Contracts for the model-backed collaborators the orchestrator
//! depends on. The session logic only relies on these signatures, never
//! on any particular backend, which keeps the state machine testable
//! with `mockall` doubles and lets the runtime swap providers freely.

use crate::bank::ResumeQuestionSet;
use crate::resume::ResumeProfile;
use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

/// Shared collaborator handles as the orchestrator holds them.
pub type DynSpeechSynthesizer = std::sync::Arc<dyn SpeechSynthesizer + Send + Sync>;
pub type DynSpeechCapture = std::sync::Arc<dyn SpeechCapture + Send + Sync>;
pub type DynTranscriber = std::sync::Arc<dyn Transcriber + Send + Sync>;
pub type DynJudge = std::sync::Arc<dyn Judge + Send + Sync>;
pub type DynTopicClassifier = std::sync::Arc<dyn TopicClassifier + Send + Sync>;
pub type DynResumeQuestionGenerator = std::sync::Arc<dyn ResumeQuestionGenerator + Send + Sync>;

/// Result of judging one answer against its expected answer.
#[derive(Debug, Clone, Copy)]
pub struct Evaluation {
    pub score: u8,
    pub is_correct: bool,
}

/// A classified topic with its confidence in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct TopicConfidence {
    pub topic: String,
    pub confidence: f32,
}

/// Text-to-speech. Synchronous in effect: narration completes before
/// the caller moves on. Failures are logged by callers, never fatal.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SpeechSynthesizer {
    async fn speak(&self, text: &str) -> Result<()>;
}

/// Microphone capture. Blocks until externally stopped (for the
/// reference runtime: the user pressing Enter). May return empty.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SpeechCapture {
    async fn record(&self) -> Result<Vec<f32>>;
}

/// Speech-to-text. Empty input yields empty text; calls may take
/// seconds, which is why only the intro transcription is on the main
/// path.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Transcriber {
    async fn transcribe(&self, samples: &[f32]) -> Result<String>;
}

/// Semantic answer judging. Empty or too-short answers score 0.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Judge {
    async fn evaluate(&self, answer: &str, expected: &str) -> Result<Evaluation>;
}

/// Free-text topic classification, sorted descending by confidence.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TopicClassifier {
    async fn classify(&self, text: &str, threshold: f32) -> Result<Vec<TopicConfidence>>;
}

/// Resume-driven question generation. May fail or return nothing
/// usable; the producer then falls back to deterministic synthesis
/// from the parsed resume.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResumeQuestionGenerator {
    async fn generate(&self, profile: &ResumeProfile, target: usize) -> Result<ResumeQuestionSet>;
}
