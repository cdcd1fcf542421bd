//! Thread-safe bank of externally generated resume questions.
//!
//! One producer task fills it in batches while the orchestrator drains
//! it between questions; a single lock around the whole collection is
//! plenty for the tens of entries a session ever holds.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::question::normalize_id;

/// Interview question categories, as produced by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Theoretical,
    Conceptual,
    Scenario,
    Puzzle,
    Behavioral,
    Project,
    Experience,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// One generated resume question with its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question: String,
    #[serde(default)]
    pub expected_answer: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A full generator batch: candidate summary plus its questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeQuestionSet {
    #[serde(default)]
    pub summary: String,
    pub questions: Vec<GeneratedQuestion>,
}

/// Running bank counters, as reported in the final report.
#[derive(Debug, Clone, Default)]
pub struct BankStats {
    pub total_added: usize,
    pub asked: usize,
    pub remaining: usize,
    pub by_kind: HashMap<QuestionKind, usize>,
}

#[derive(Default)]
struct BankInner {
    queued: Vec<GeneratedQuestion>,
    seen: HashSet<String>,
    generation_complete: bool,
    /// Difficulty tier cursor for the balanced interleave.
    tier_cursor: usize,
    total_added: usize,
    asked: usize,
    by_kind: HashMap<QuestionKind, usize>,
}

/// Balanced pop order: medium first, then easy, then hard, repeating.
const TIER_ORDER: [Difficulty; 3] = [Difficulty::Medium, Difficulty::Easy, Difficulty::Hard];

#[derive(Default)]
pub struct ResumeQuestionBank {
    inner: Mutex<BankInner>,
}

impl ResumeQuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> MutexGuard<'_, BankInner> {
        // A poisoned lock only means another thread panicked mid-update;
        // the bank state itself is always consistent between operations.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Merge a generated batch, de-duplicating against every question
    /// text seen so far. Returns how many entries were actually added.
    pub fn add_questions(&self, batch: Vec<GeneratedQuestion>) -> usize {
        let mut inner = self.locked();
        let mut added = 0;
        for question in batch {
            if question.question.trim().is_empty() {
                continue;
            }
            if inner.seen.insert(normalize_id(&question.question)) {
                *inner.by_kind.entry(question.kind).or_default() += 1;
                inner.queued.push(question);
                inner.total_added += 1;
                added += 1;
            }
        }
        if added > 0 {
            tracing::debug!(added, total = inner.total_added, "resume bank grew");
        }
        added
    }

    pub fn has_questions(&self) -> bool {
        !self.locked().queued.is_empty()
    }

    /// Remove and return the next question, interleaving difficulty
    /// tiers (medium, easy, hard) rather than insertion order.
    pub fn next_question(&self) -> Option<GeneratedQuestion> {
        let mut inner = self.locked();
        if inner.queued.is_empty() {
            return None;
        }
        for step in 0..TIER_ORDER.len() {
            let tier = TIER_ORDER[(inner.tier_cursor + step) % TIER_ORDER.len()];
            if let Some(pos) = inner.queued.iter().position(|q| q.difficulty == tier) {
                inner.tier_cursor = (inner.tier_cursor + step + 1) % TIER_ORDER.len();
                inner.asked += 1;
                return Some(inner.queued.remove(pos));
            }
        }
        // Unreachable given a non-empty queue, but never hang on it.
        inner.asked += 1;
        Some(inner.queued.remove(0))
    }

    pub fn set_generation_complete(&self, complete: bool) {
        self.locked().generation_complete = complete;
    }

    pub fn generation_complete(&self) -> bool {
        self.locked().generation_complete
    }

    pub fn stats(&self) -> BankStats {
        let inner = self.locked();
        BankStats {
            total_added: inner.total_added,
            asked: inner.asked,
            remaining: inner.queued.len(),
            by_kind: inner.by_kind.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(text: &str, kind: QuestionKind, difficulty: Difficulty) -> GeneratedQuestion {
        GeneratedQuestion {
            question: text.to_string(),
            expected_answer: String::new(),
            kind,
            difficulty,
            section: "skills".to_string(),
            keywords: vec![],
        }
    }

    #[test]
    fn add_questions_deduplicates_on_normalized_text() {
        let bank = ResumeQuestionBank::new();
        let added = bank.add_questions(vec![
            q("Tell me about Rust.", QuestionKind::Theoretical, Difficulty::Medium),
            q("tell me about RUST?", QuestionKind::Theoretical, Difficulty::Easy),
            q("Tell me about Go.", QuestionKind::Theoretical, Difficulty::Easy),
        ]);
        assert_eq!(added, 2);
        assert_eq!(bank.stats().total_added, 2);
    }

    #[test]
    fn next_question_interleaves_difficulty_tiers() {
        let bank = ResumeQuestionBank::new();
        bank.add_questions(vec![
            q("e1", QuestionKind::Experience, Difficulty::Easy),
            q("e2", QuestionKind::Experience, Difficulty::Easy),
            q("m1", QuestionKind::Project, Difficulty::Medium),
            q("m2", QuestionKind::Project, Difficulty::Medium),
            q("h1", QuestionKind::Scenario, Difficulty::Hard),
        ]);
        let order: Vec<Difficulty> = std::iter::from_fn(|| bank.next_question())
            .map(|q| q.difficulty)
            .collect();
        assert_eq!(
            order,
            vec![
                Difficulty::Medium,
                Difficulty::Easy,
                Difficulty::Hard,
                Difficulty::Medium,
                Difficulty::Easy,
            ]
        );
        assert!(bank.next_question().is_none());
    }

    #[test]
    fn stats_track_added_asked_and_remaining() {
        let bank = ResumeQuestionBank::new();
        bank.add_questions(vec![
            q("a", QuestionKind::Project, Difficulty::Medium),
            q("b", QuestionKind::Behavioral, Difficulty::Easy),
        ]);
        bank.next_question();
        let stats = bank.stats();
        assert_eq!(stats.total_added, 2);
        assert_eq!(stats.asked, 1);
        assert_eq!(stats.remaining, 1);
        assert_eq!(stats.by_kind[&QuestionKind::Project], 1);
    }

    #[test]
    fn generation_complete_flag_round_trips() {
        let bank = ResumeQuestionBank::new();
        assert!(!bank.generation_complete());
        bank.set_generation_complete(true);
        assert!(bank.generation_complete());
    }

    #[test]
    fn concurrent_producer_and_consumer_agree_on_counts() {
        use std::sync::Arc;
        let bank = Arc::new(ResumeQuestionBank::new());
        let producer = {
            let bank = Arc::clone(&bank);
            std::thread::spawn(move || {
                for i in 0..50 {
                    bank.add_questions(vec![q(
                        &format!("question {i}"),
                        QuestionKind::Theoretical,
                        Difficulty::Medium,
                    )]);
                }
                bank.set_generation_complete(true);
            })
        };
        let mut taken = 0;
        while !bank.generation_complete() || bank.has_questions() {
            if bank.next_question().is_some() {
                taken += 1;
            }
        }
        producer.join().expect("producer thread panicked");
        while bank.next_question().is_some() {
            taken += 1;
        }
        assert_eq!(taken, 50);
    }
}
