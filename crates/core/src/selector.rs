//! Adaptive question selection: keyword-driven counter-questions with
//! a random-unused fallback.

use rand::seq::SliceRandom;
use std::collections::HashSet;
use std::sync::Arc;

use crate::catalog::{KeywordIndex, QuestionCatalog};
use crate::question::{QuestionRecord, QuestionSource};

/// Spoken lead-ins for a counter-question; `{}` is the keyword.
const TRANSITION_PHRASES: &[&str] = &[
    "Going back to what you mentioned about {}. ",
    "You touched on {} earlier. ",
    "Related to your point about {}. ",
    "Speaking of {}. ",
];

/// A question picked by the selector, with its optional narration
/// prefix (present only for adaptive picks).
#[derive(Debug, Clone)]
pub struct SelectedQuestion {
    pub record: QuestionRecord,
    pub prefix: Option<String>,
}

pub struct AdaptiveSelector {
    catalog: Arc<QuestionCatalog>,
    index: Arc<KeywordIndex>,
}

impl AdaptiveSelector {
    pub fn new(catalog: Arc<QuestionCatalog>, index: Arc<KeywordIndex>) -> Self {
        Self { catalog, index }
    }

    /// Counter-question for a detected keyword, restricted to the
    /// allowed topic set so a keyword from one stack can never drag
    /// the interview into an undetected topic. Prefers the current
    /// topic, accepts any allowed topic otherwise.
    pub fn adaptive(
        &self,
        keyword: &str,
        current_topic: &str,
        allowed_topics: &[String],
        asked: &HashSet<String>,
    ) -> Option<SelectedQuestion> {
        let hits: Vec<_> = self
            .index
            .lookup(keyword)
            .iter()
            .filter(|hit| {
                (hit.topic == current_topic || allowed_topics.contains(&hit.topic))
                    && !asked.contains(&crate::question::normalize_id(&hit.question))
            })
            .collect();

        let hit = hits
            .iter()
            .find(|h| h.topic == current_topic)
            .or_else(|| hits.first())?;

        let phrase = TRANSITION_PHRASES
            .choose(&mut rand::thread_rng())
            .unwrap_or(&TRANSITION_PHRASES[0]);
        Some(SelectedQuestion {
            record: QuestionRecord::new(
                hit.question.clone(),
                hit.expected.clone(),
                hit.topic.clone(),
                QuestionSource::Adaptive,
            ),
            prefix: Some(phrase.replace("{}", keyword)),
        })
    }

    /// Uniformly-random unused catalog question for the topic; `None`
    /// signals exhaustion and forces a topic transition upstream.
    pub fn fallback(&self, topic: &str, asked: &HashSet<String>) -> Option<SelectedQuestion> {
        let (question, expected) = self.catalog.random_unused(topic, asked)?;
        Some(SelectedQuestion {
            record: QuestionRecord::new(question, expected, topic, QuestionSource::Local),
            prefix: None,
        })
    }
}
