//! Feedback report generation.
//!
//! The report is written exactly once per session: the generator
//! drains the scoring pipeline first so late grades land in the file,
//! and an internal flag makes repeat calls a no-op.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

use crate::bank::BankStats;
use crate::pipeline::SessionSignals;
use crate::question::{QuestionSource, ScoreEntry};

/// Session facts that live outside the score card but belong in the
/// written report.
#[derive(Debug, Clone, Default)]
pub struct ReportContext {
    pub candidate_name: Option<String>,
    pub resume_summary: Option<String>,
    pub bank_stats: Option<BankStats>,
    pub detected_topics: Vec<String>,
}

pub struct ReportGenerator {
    path: PathBuf,
    written: AtomicBool,
}

impl ReportGenerator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            written: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Waits for every in-flight grade, then writes the report file.
    /// Returns `Ok(None)` when a report for this session already
    /// exists on disk.
    pub async fn generate(
        &self,
        signals: &SessionSignals,
        context: &ReportContext,
    ) -> Result<Option<PathBuf>> {
        if self.written.swap(true, Ordering::SeqCst) {
            return Ok(None);
        }

        signals.wait_idle().await;
        let entries = signals.report_card().await;

        let body = render(&entries, context);
        std::fs::write(&self.path, body)
            .with_context(|| format!("writing report to {}", self.path.display()))?;
        info!(path = %self.path.display(), questions = entries.len(), "feedback report written");
        Ok(Some(self.path.clone()))
    }
}

fn render(entries: &[ScoreEntry], context: &ReportContext) -> String {
    let mut out = String::new();
    out.push_str("INTERVIEW FEEDBACK REPORT\n");
    out.push_str("=========================\n");
    out.push_str(&format!(
        "Candidate: {}\n",
        context.candidate_name.as_deref().unwrap_or("Unknown")
    ));
    if !context.detected_topics.is_empty() {
        out.push_str(&format!(
            "Topics covered: {}\n",
            context.detected_topics.join(", ")
        ));
    }
    out.push('\n');

    if let Some(summary) = context
        .resume_summary
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        out.push_str("RESUME PROFILE\n");
        out.push_str("--------------\n");
        out.push_str(summary.trim());
        out.push_str("\n\n");
    }

    if let Some(stats) = &context.bank_stats {
        out.push_str("RESUME QUESTION BANK\n");
        out.push_str("--------------------\n");
        out.push_str(&format!(
            "Generated: {} | Asked: {} | Remaining: {}\n\n",
            stats.total_added, stats.asked, stats.remaining
        ));
    }

    for (i, entry) in entries.iter().enumerate() {
        out.push_str(&format!("Q{} [{}]: {}\n", i + 1, entry.topic, entry.question));
        out.push_str(&format!("You Said: {}\n", entry.answer));
        out.push_str(&format!("Expected: {}\n", entry.expected));
        out.push_str(&format!("Score: {}/100\n\n", entry.score));
    }

    let resume_count = entries
        .iter()
        .filter(|e| e.source == QuestionSource::ResumeGenerated)
        .count();
    out.push_str("-----------------------------------\n");
    out.push_str(&format!("Questions answered: {}\n", entries.len()));
    out.push_str(&format!(
        "Resume-based: {} | General: {}\n",
        resume_count,
        entries.len() - resume_count
    ));
    out.push_str(&format!("FINAL SCORE: {}/100\n", final_score(entries)));
    out
}

/// Plain floor average; an empty card scores zero.
pub fn final_score(entries: &[ScoreEntry]) -> u8 {
    if entries.is_empty() {
        return 0;
    }
    let total: u32 = entries.iter().map(|e| u32::from(e.score)).sum();
    (total / entries.len() as u32) as u8
}

/// Short spoken recap of the weakest answers, capped so the closing
/// doesn't drag on. A clean card earns a congratulation instead.
pub fn verbal_feedback(entries: &[ScoreEntry], weak_threshold: u8, limit: usize) -> String {
    let weak: Vec<&ScoreEntry> = entries
        .iter()
        .filter(|e| e.score < weak_threshold)
        .take(limit)
        .collect();
    if weak.is_empty() {
        return "Great work today. You answered confidently across the board.".to_string();
    }
    let mut out = String::from("Before we wrap up, a few areas worth revisiting. ");
    for entry in weak {
        out.push_str(&format!(
            "On '{}', a stronger answer covers: {}. ",
            entry.question, entry.expected
        ));
    }
    out.trim_end().to_string()
}
