//! Scoring pipeline: a bounded task queue drained by exactly one
//! worker task.
//!
//! The orchestrator submits a recording and immediately moves on to
//! the next question; the worker transcribes, extracts control intents
//! and adaptive keywords, judges, and appends the score entry. One
//! worker means entries land on the report card in submission order
//! with no extra ordering machinery.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, Notify};
use tokio::task::JoinHandle;

use crate::catalog::KeywordIndex;
use crate::collaborators::{DynJudge, DynTranscriber};
use crate::question::{QuestionRecord, ScoreEntry};

/// Phrases that end the interview when heard in an answer.
const STOP_PHRASES: &[&str] = &["stop interview", "terminate", "end session", "abort"];
/// Phrases that mark an answer as a skip.
const SKIP_PHRASES: &[&str] = &["don't know", "skip", "no idea", "pass", "next question"];

const TASK_QUEUE_CAP: usize = 64;
const KEYWORD_QUEUE_CAP: usize = 8;

#[derive(Default)]
struct SignalsInner {
    pending: usize,
    stop_requested: bool,
    skip_requested: bool,
    used_keywords: HashSet<String>,
    report_card: Vec<ScoreEntry>,
}

/// The one mutex shared between the orchestrator and the scoring
/// worker. Critical sections are a flag write, a counter bump, or a
/// single append; nothing is held across a collaborator call.
#[derive(Default)]
pub struct SessionSignals {
    inner: Mutex<SignalsInner>,
    idle: Notify,
}

impl SessionSignals {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) async fn begin_task(&self) {
        self.inner.lock().await.pending += 1;
    }

    /// Record the outcome of one task (a score entry, or nothing for a
    /// failed task) and wake any drain waiter.
    pub(crate) async fn finish_task(&self, entry: Option<ScoreEntry>) {
        {
            let mut inner = self.inner.lock().await;
            if let Some(entry) = entry {
                inner.report_card.push(entry);
            }
            inner.pending = inner.pending.saturating_sub(1);
        }
        self.idle.notify_one();
    }

    pub async fn pending(&self) -> usize {
        self.inner.lock().await.pending
    }

    /// Block until every submitted task has been processed.
    pub async fn wait_idle(&self) {
        loop {
            if self.inner.lock().await.pending == 0 {
                return;
            }
            self.idle.notified().await;
        }
    }

    pub async fn request_stop(&self) {
        self.inner.lock().await.stop_requested = true;
    }

    pub async fn request_skip(&self) {
        self.inner.lock().await.skip_requested = true;
    }

    pub async fn stop_requested(&self) -> bool {
        self.inner.lock().await.stop_requested
    }

    /// Consume-and-clear the skip flag for this loop iteration.
    pub async fn take_skip(&self) -> bool {
        let mut inner = self.inner.lock().await;
        std::mem::take(&mut inner.skip_requested)
    }

    pub async fn keyword_used(&self, keyword: &str) -> bool {
        self.inner.lock().await.used_keywords.contains(keyword)
    }

    pub async fn mark_keyword_used(&self, keyword: &str) {
        self.inner
            .lock()
            .await
            .used_keywords
            .insert(keyword.to_string());
    }

    pub async fn report_card(&self) -> Vec<ScoreEntry> {
        self.inner.lock().await.report_card.clone()
    }
}

struct ScoringJob {
    samples: Vec<f32>,
    record: QuestionRecord,
}

enum Task {
    Score(Box<ScoringJob>),
    /// Sentinel: the worker loop exits on receipt.
    Shutdown,
}

pub struct ScoringPipeline {
    task_tx: mpsc::Sender<Task>,
    worker: JoinHandle<()>,
    signals: Arc<SessionSignals>,
}

impl ScoringPipeline {
    /// Start the single worker. Returns the pipeline handle plus the
    /// bounded keyword queue the adaptive selector drains; keeping
    /// keywords on their own channel avoids head-of-line blocking
    /// behind slow scoring tasks.
    pub fn spawn(
        transcriber: DynTranscriber,
        judge: DynJudge,
        index: Arc<KeywordIndex>,
        signals: Arc<SessionSignals>,
    ) -> (Self, mpsc::Receiver<String>) {
        let (task_tx, mut task_rx) = mpsc::channel::<Task>(TASK_QUEUE_CAP);
        let (keyword_tx, keyword_rx) = mpsc::channel::<String>(KEYWORD_QUEUE_CAP);

        let worker_signals = Arc::clone(&signals);
        let worker = tokio::spawn(async move {
            tracing::debug!("scoring worker started");
            while let Some(task) = task_rx.recv().await {
                let job = match task {
                    Task::Shutdown => break,
                    Task::Score(job) => job,
                };
                let question = job.record.text.clone();
                let outcome = score_job(
                    *job,
                    &transcriber,
                    &judge,
                    &index,
                    &worker_signals,
                    &keyword_tx,
                )
                .await;
                let entry = match outcome {
                    Ok(entry) => {
                        tracing::info!(
                            question = %truncate(&entry.question, 30),
                            answer = %truncate(&entry.answer, 30),
                            score = entry.score,
                            "answer processed"
                        );
                        Some(entry)
                    }
                    Err(e) => {
                        // A failed task must not take the worker down.
                        tracing::error!(question = %question, "scoring task failed: {e:#}");
                        None
                    }
                };
                worker_signals.finish_task(entry).await;
            }
            tracing::debug!("scoring worker stopped");
        });

        (
            Self {
                task_tx,
                worker,
                signals,
            },
            keyword_rx,
        )
    }

    /// Queue a recording for background scoring. Only waits if the
    /// bounded queue is full, which a single-session pace never hits.
    pub async fn submit(&self, samples: Vec<f32>, record: QuestionRecord) -> Result<()> {
        self.signals.begin_task().await;
        let pending = self.signals.pending().await;
        tracing::debug!(pending, question = %truncate(&record.text, 30), "answer queued");
        self.task_tx
            .send(Task::Score(Box::new(ScoringJob { samples, record })))
            .await
            .context("scoring worker is gone")
    }

    pub fn signals(&self) -> &Arc<SessionSignals> {
        &self.signals
    }

    /// Send the shutdown sentinel and wait for the worker to exit.
    pub async fn shutdown(self) {
        if self.task_tx.send(Task::Shutdown).await.is_err() {
            tracing::warn!("scoring worker already stopped");
        }
        if let Err(e) = self.worker.await {
            tracing::error!("scoring worker panicked: {e}");
        }
    }
}

async fn score_job(
    job: ScoringJob,
    transcriber: &DynTranscriber,
    judge: &DynJudge,
    index: &KeywordIndex,
    signals: &SessionSignals,
    keyword_tx: &mpsc::Sender<String>,
) -> Result<ScoreEntry> {
    let transcript = transcriber
        .transcribe(&job.samples)
        .await
        .context("transcription failed")?;

    let lowered = transcript.to_lowercase();
    if STOP_PHRASES.iter().any(|p| lowered.contains(p)) {
        tracing::info!("stop intent detected");
        signals.request_stop().await;
    } else if SKIP_PHRASES.iter().any(|p| lowered.contains(p)) {
        tracing::info!("skip intent detected");
        signals.request_skip().await;
    }

    if let Some(keyword) = index.longest_match(&transcript) {
        // Full keyword queue just means the selector is behind; the
        // candidate is dropped, not buffered.
        match keyword_tx.try_send(keyword.clone()) {
            Ok(()) => tracing::debug!(keyword, "adaptive keyword queued"),
            Err(_) => tracing::debug!(keyword, "keyword queue full, dropping"),
        }
    }

    let evaluation = judge
        .evaluate(&transcript, &job.record.expected_answer)
        .await
        .context("judging failed")?;

    Ok(ScoreEntry {
        topic: job.record.topic,
        question: job.record.text,
        answer: transcript,
        expected: job.record.expected_answer,
        score: evaluation.score,
        source: job.record.source,
    })
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
