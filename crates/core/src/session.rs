//! Interview session orchestration.
//!
//! The session is a phased loop: intro classification, a local-question
//! warmup while the resume producer fills the bank, a resume deep dive,
//! per-topic deep dives with keyword-driven counter-questions, a short
//! mixed round, and a closing checkout. Answers are never graded on the
//! main path; they go to the scoring pipeline and the loop moves on.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::bank::ResumeQuestionBank;
use crate::catalog::{KeywordIndex, QuestionCatalog};
use crate::collaborators::{
    DynJudge, DynSpeechCapture, DynSpeechSynthesizer, DynTopicClassifier, DynTranscriber,
};
use crate::config::InterviewConfig;
use crate::pipeline::{ScoringPipeline, SessionSignals};
use crate::question::{normalize_id, QuestionRecord, QuestionSource};
use crate::report::{verbal_feedback, ReportContext, ReportGenerator};
use crate::resume::ResumeProfile;
use crate::selector::{AdaptiveSelector, SelectedQuestion};

const CHECKOUT_QUESTION: &str =
    "That's all my prepared questions. Is there anything you'd like to ask or add before we finish?";
const COVERAGE_PROBE: &str =
    "Before we move on, is there anything else from your background you'd like to talk about?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Intro,
    ResumeWarmup,
    ResumeDeepDive,
    DeepDive,
    MixRound,
    Finished,
}

/// The model-backed collaborators a session needs, bundled so the
/// constructor stays readable.
pub struct Collaborators {
    pub voice: DynSpeechSynthesizer,
    pub capture: DynSpeechCapture,
    pub transcriber: DynTranscriber,
    pub judge: DynJudge,
    pub classifier: DynTopicClassifier,
}

#[derive(Debug)]
struct SessionState {
    phase: Phase,
    detected_topics: Vec<String>,
    topic_cursor: usize,
    current_topic: String,
    asked_in_topic: usize,
    asked_ids: HashSet<String>,
    exhausted: HashSet<String>,
    warmup_asked: usize,
    resume_asked: usize,
    mix_asked: usize,
    coverage_probed: bool,
    checkout_asked: bool,
}

pub struct Interviewer {
    config: InterviewConfig,
    voice: DynSpeechSynthesizer,
    capture: DynSpeechCapture,
    transcriber: DynTranscriber,
    classifier: DynTopicClassifier,
    catalog: Arc<QuestionCatalog>,
    selector: AdaptiveSelector,
    bank: Arc<ResumeQuestionBank>,
    pipeline: ScoringPipeline,
    keywords: mpsc::Receiver<String>,
    report: ReportGenerator,
    resume_profile: Option<ResumeProfile>,
    state: SessionState,
}

impl Interviewer {
    pub fn new(
        config: InterviewConfig,
        collaborators: Collaborators,
        catalog: Arc<QuestionCatalog>,
        bank: Arc<ResumeQuestionBank>,
        resume_profile: Option<ResumeProfile>,
        report_path: impl Into<std::path::PathBuf>,
    ) -> Self {
        let index = Arc::new(KeywordIndex::build(&catalog));
        let signals = Arc::new(SessionSignals::new());
        let (pipeline, keywords) = ScoringPipeline::spawn(
            collaborators.transcriber.clone(),
            collaborators.judge,
            Arc::clone(&index),
            signals,
        );
        let selector = AdaptiveSelector::new(Arc::clone(&catalog), index);
        let fallback_topic = config.fallback_topic.clone();
        Self {
            config,
            voice: collaborators.voice,
            capture: collaborators.capture,
            transcriber: collaborators.transcriber,
            classifier: collaborators.classifier,
            catalog,
            selector,
            bank,
            pipeline,
            keywords,
            report: ReportGenerator::new(report_path.into()),
            resume_profile,
            state: SessionState {
                phase: Phase::Intro,
                detected_topics: Vec::new(),
                topic_cursor: 0,
                current_topic: fallback_topic,
                asked_in_topic: 0,
                asked_ids: HashSet::new(),
                exhausted: HashSet::new(),
                warmup_asked: 0,
                resume_asked: 0,
                mix_asked: 0,
                coverage_probed: false,
                checkout_asked: false,
            },
        }
    }

    /// Shared signal block, exposed so callers can observe or request
    /// stop/skip from outside the loop.
    pub fn signals(&self) -> Arc<SessionSignals> {
        Arc::clone(self.pipeline.signals())
    }

    /// Run the interview to completion. A broken loop (dead microphone,
    /// collaborator outage) still flows into the closing sequence so
    /// the answers already graded are not lost.
    pub async fn run(mut self) -> Result<()> {
        if let Err(e) = self.conduct().await {
            tracing::error!("interview loop aborted: {e:#}");
        }
        self.finish().await
    }

    async fn conduct(&mut self) -> Result<()> {
        loop {
            let signals = self.pipeline.signals();
            if signals.stop_requested().await {
                info!("stop requested, leaving the question loop");
                return Ok(());
            }
            if signals.take_skip().await {
                self.voice
                    .speak("No problem, let's move on.")
                    .await
                    .context("skip narration failed")?;
            }
            match self.state.phase {
                Phase::Intro => self.intro().await?,
                Phase::ResumeWarmup => self.warmup_step().await?,
                Phase::ResumeDeepDive => self.resume_step().await?,
                Phase::DeepDive => self.deep_dive_step().await?,
                Phase::MixRound => self.mix_step().await?,
                Phase::Finished => return Ok(()),
            }
        }
    }

    /// Greet, capture the self-introduction, and classify it into the
    /// topics the rest of the session draws from. The intro answer is
    /// never scored.
    async fn intro(&mut self) -> Result<()> {
        let greeting = if self.resume_profile.is_some() {
            "Welcome to your mock interview. I've gone through your resume. \
             To get started, tell me a bit about yourself and the technologies you work with."
        } else {
            "Welcome to your mock interview. To get started, tell me a bit about \
             yourself and the technologies you work with."
        };
        self.voice.speak(greeting).await.context("greeting failed")?;

        let samples = self.capture.record().await.context("intro capture failed")?;
        let transcript = self
            .transcriber
            .transcribe(&samples)
            .await
            .context("intro transcription failed")?;
        let detected = self
            .classifier
            .classify(&transcript, self.config.classify_threshold)
            .await
            .context("intro classification failed")?;

        let mut topics: Vec<String> = Vec::new();
        for candidate in detected {
            if self.catalog.topics().contains(&candidate.topic)
                && !topics.contains(&candidate.topic)
            {
                topics.push(candidate.topic);
            }
        }
        if topics.is_empty() {
            info!(fallback = %self.config.fallback_topic, "no topic cleared the threshold");
            topics.push(self.config.fallback_topic.clone());
        }
        info!(topics = ?topics, "interview topics settled");

        self.voice
            .speak(&format!("Great. Today we'll focus on {}.", topics.join(", ")))
            .await
            .context("topic announcement failed")?;

        self.state.current_topic = topics[0].clone();
        self.state.detected_topics = topics;
        self.state.topic_cursor = 0;
        self.state.phase = Phase::ResumeWarmup;
        Ok(())
    }

    /// Local questions while the resume producer is still working.
    /// Warmup hands over only once generation has finished: to the
    /// resume deep dive when the bank holds questions, straight to the
    /// deep dive when it came up empty.
    async fn warmup_step(&mut self) -> Result<()> {
        if self.bank.generation_complete() {
            if self.bank.has_questions() {
                info!("resume questions ready, moving to resume deep dive");
                self.state.phase = Phase::ResumeDeepDive;
            } else {
                self.state.phase = Phase::DeepDive;
            }
            return Ok(());
        }
        if self.state.warmup_asked >= self.config.warmup_cap {
            // Producer still running past the cap: give it a beat
            // instead of burning more local questions.
            tokio::time::sleep(std::time::Duration::from_millis(250)).await;
            return Ok(());
        }
        match self
            .selector
            .fallback(&self.state.current_topic, &self.state.asked_ids)
        {
            Some(selected) => {
                self.ask(selected).await?;
                self.state.warmup_asked += 1;
                self.state.asked_in_topic += 1;
            }
            None => {
                self.state.exhausted.insert(self.state.current_topic.clone());
                self.advance_topic().await?;
            }
        }
        Ok(())
    }

    /// Drain the resume question bank. On exhaustion with thin
    /// coverage, probe once for more material and fold any new topics
    /// into the session.
    async fn resume_step(&mut self) -> Result<()> {
        while let Some(generated) = self.bank.next_question() {
            if self.state.asked_ids.contains(&normalize_id(&generated.question)) {
                continue;
            }
            let topic = if generated.section.trim().is_empty() {
                "Resume".to_string()
            } else {
                generated.section.clone()
            };
            let record = QuestionRecord::new(
                generated.question,
                generated.expected_answer,
                topic,
                QuestionSource::ResumeGenerated,
            );
            self.ask(SelectedQuestion {
                record,
                prefix: None,
            })
            .await?;
            self.state.resume_asked += 1;
            return Ok(());
        }

        if !self.bank.generation_complete() {
            // Producer mid-flight with an empty buffer: keep the
            // candidate talking on local questions.
            return self.warmup_step().await;
        }

        if self.state.resume_asked < self.config.coverage_floor && !self.state.coverage_probed {
            self.state.coverage_probed = true;
            self.coverage_probe().await?;
        }
        info!(asked = self.state.resume_asked, "resume bank drained");
        self.state.phase = Phase::DeepDive;
        Ok(())
    }

    /// One open probe when the resume yielded fewer questions than the
    /// coverage floor. The answer is classified, not scored, and any
    /// new topics join the deep-dive rotation.
    async fn coverage_probe(&mut self) -> Result<()> {
        self.voice
            .speak(COVERAGE_PROBE)
            .await
            .context("coverage probe failed")?;
        let samples = self.capture.record().await.context("probe capture failed")?;
        let transcript = self
            .transcriber
            .transcribe(&samples)
            .await
            .context("probe transcription failed")?;
        let detected = self
            .classifier
            .classify(&transcript, self.config.classify_threshold)
            .await
            .context("probe classification failed")?;
        for candidate in detected {
            if self.catalog.topics().contains(&candidate.topic)
                && !self.state.detected_topics.contains(&candidate.topic)
            {
                info!(topic = %candidate.topic, "probe surfaced a new topic");
                self.state.detected_topics.push(candidate.topic);
            }
        }
        // Resume skills that name a catalog topic join the rotation too.
        if let Some(profile) = &self.resume_profile {
            for skill in &profile.skills {
                let Some(topic) = self
                    .catalog
                    .topics()
                    .iter()
                    .find(|t| t.eq_ignore_ascii_case(skill))
                else {
                    continue;
                };
                if !self.state.detected_topics.contains(topic) {
                    info!(topic = %topic, "resume skill added to the topic pool");
                    self.state.detected_topics.push(topic.clone());
                }
            }
        }
        Ok(())
    }

    async fn deep_dive_step(&mut self) -> Result<()> {
        if self.state.asked_in_topic >= self.config.questions_per_topic {
            self.advance_topic().await?;
            return Ok(());
        }
        match self.next_question().await {
            Some(selected) => {
                self.ask(selected).await?;
                self.state.asked_in_topic += 1;
            }
            None => {
                self.state.exhausted.insert(self.state.current_topic.clone());
                self.advance_topic().await?;
            }
        }
        Ok(())
    }

    /// Adaptive pick first: drain the keyword queue and counter-question
    /// on the first unused keyword that maps into the detected topics.
    /// Otherwise a random unused local question on the current topic.
    async fn next_question(&mut self) -> Option<SelectedQuestion> {
        let signals = Arc::clone(self.pipeline.signals());
        while let Ok(keyword) = self.keywords.try_recv() {
            if signals.keyword_used(&keyword).await {
                continue;
            }
            if let Some(selected) = self.selector.adaptive(
                &keyword,
                &self.state.current_topic,
                &self.state.detected_topics,
                &self.state.asked_ids,
            ) {
                signals.mark_keyword_used(&keyword).await;
                info!(keyword, topic = %selected.record.topic, "asking counter-question");
                return Some(selected);
            }
        }
        self.selector
            .fallback(&self.state.current_topic, &self.state.asked_ids)
    }

    /// Move to the next non-exhausted detected topic, or into the mix
    /// round when the rotation is spent.
    async fn advance_topic(&mut self) -> Result<()> {
        self.state.asked_in_topic = 0;
        loop {
            self.state.topic_cursor += 1;
            let Some(topic) = self.state.detected_topics.get(self.state.topic_cursor) else {
                self.state.phase = Phase::MixRound;
                return Ok(());
            };
            if !self.state.exhausted.contains(topic) {
                self.state.current_topic = topic.clone();
                self.voice
                    .speak(&format!("Let's switch gears to {}.", topic))
                    .await
                    .context("topic transition failed")?;
                return Ok(());
            }
        }
    }

    /// Short closing round cycling across every detected topic.
    async fn mix_step(&mut self) -> Result<()> {
        if self.state.mix_asked >= self.config.mix_round_count {
            self.state.phase = Phase::Finished;
            return Ok(());
        }
        let topics = self.state.detected_topics.clone();
        for offset in 0..topics.len() {
            let topic = &topics[(self.state.mix_asked + offset) % topics.len()];
            if let Some(selected) = self.selector.fallback(topic, &self.state.asked_ids) {
                self.ask(selected).await?;
                self.state.mix_asked += 1;
                return Ok(());
            }
        }
        info!("catalog exhausted across all topics, closing the mix round");
        self.state.phase = Phase::Finished;
        Ok(())
    }

    /// Speak the question, capture the answer, and hand it to the
    /// scoring pipeline without waiting for the grade.
    async fn ask(&mut self, selected: SelectedQuestion) -> Result<()> {
        let mut line = selected.prefix.unwrap_or_default();
        line.push_str(&selected.record.text);
        self.voice.speak(&line).await.context("question narration failed")?;
        let samples = self.capture.record().await.context("answer capture failed")?;
        self.state.asked_ids.insert(selected.record.id.clone());
        self.pipeline.submit(samples, selected.record).await
    }

    /// Closing sequence: checkout question (unless stopped), report,
    /// spoken feedback, pipeline shutdown. Narration failures here are
    /// logged, never fatal, so the report always lands on disk.
    async fn finish(mut self) -> Result<()> {
        let signals = Arc::clone(self.pipeline.signals());
        let stopped = signals.stop_requested().await;

        if stopped {
            if let Err(e) = self.voice.speak("Understood, we'll end the interview here.").await {
                warn!("closing narration failed: {e:#}");
            }
        } else if let Err(e) = self.checkout().await {
            warn!("checkout question failed: {e:#}");
        }

        let context = ReportContext {
            candidate_name: self
                .resume_profile
                .as_ref()
                .and_then(|p| p.name.clone()),
            resume_summary: self.resume_profile.as_ref().and_then(|p| p.summary.clone()),
            bank_stats: Some(self.bank.stats()),
            detected_topics: self.state.detected_topics.clone(),
        };
        // Drains the pipeline before reading the card.
        self.report
            .generate(&signals, &context)
            .await
            .context("report generation failed")?;

        let card = signals.report_card().await;
        let feedback = verbal_feedback(
            &card,
            self.config.weak_score_threshold,
            self.config.verbal_feedback_limit,
        );
        if let Err(e) = self.voice.speak(&feedback).await {
            warn!("feedback narration failed: {e:#}");
        }
        if let Err(e) = self
            .voice
            .speak(&format!(
                "Your written feedback is saved to {}.",
                self.report.path().display()
            ))
            .await
        {
            warn!("report path narration failed: {e:#}");
        }

        self.pipeline.shutdown().await;
        Ok(())
    }

    /// Asked at most once per session, whatever path leads here.
    async fn checkout(&mut self) -> Result<()> {
        if self.state.checkout_asked {
            return Ok(());
        }
        self.state.checkout_asked = true;
        self.voice.speak(CHECKOUT_QUESTION).await?;
        let samples = self.capture.record().await?;
        let record = QuestionRecord::new(
            CHECKOUT_QUESTION,
            "Any closing questions or remarks.",
            "General",
            QuestionSource::Checkout,
        );
        self.state.asked_ids.insert(record.id.clone());
        self.pipeline.submit(samples, record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::{Difficulty, GeneratedQuestion, QuestionKind};
    use crate::collaborators::{
        Evaluation, Judge, SpeechCapture, SpeechSynthesizer, TopicClassifier, TopicConfidence,
        Transcriber,
    };
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Mutex, OnceLock};

    /// Synthesizer double that records every spoken line.
    struct RecordingVoice {
        lines: Mutex<Vec<String>>,
    }

    impl RecordingVoice {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                lines: Mutex::new(Vec::new()),
            })
        }

        fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for RecordingVoice {
        async fn speak(&self, text: &str) -> Result<()> {
            self.lines.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    /// Capture double that waits for the pipeline to drain before
    /// "finishing" a recording, so every prior answer's intents and
    /// keywords are visible by the time the next one is submitted.
    struct SyncedCapture {
        signals: OnceLock<Arc<SessionSignals>>,
    }

    impl SyncedCapture {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                signals: OnceLock::new(),
            })
        }

        fn attach(&self, signals: Arc<SessionSignals>) {
            let _ = self.signals.set(signals);
        }
    }

    #[async_trait]
    impl SpeechCapture for SyncedCapture {
        async fn record(&self) -> Result<Vec<f32>> {
            if let Some(signals) = self.signals.get() {
                signals.wait_idle().await;
            }
            Ok(vec![0.0; 8])
        }
    }

    /// Transcriber double returning scripted lines in order, empty
    /// afterwards.
    struct ScriptedTranscriber {
        lines: Mutex<VecDeque<String>>,
    }

    impl ScriptedTranscriber {
        fn new(lines: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                lines: Mutex::new(lines.iter().map(|l| l.to_string()).collect()),
            })
        }
    }

    #[async_trait]
    impl Transcriber for ScriptedTranscriber {
        async fn transcribe(&self, _samples: &[f32]) -> Result<String> {
            Ok(self.lines.lock().unwrap().pop_front().unwrap_or_default())
        }
    }

    struct ScriptedJudge {
        scores: Mutex<VecDeque<u8>>,
        default: u8,
    }

    impl ScriptedJudge {
        fn constant(score: u8) -> Arc<Self> {
            Arc::new(Self {
                scores: Mutex::new(VecDeque::new()),
                default: score,
            })
        }

        fn scripted(scores: &[u8], default: u8) -> Arc<Self> {
            Arc::new(Self {
                scores: Mutex::new(scores.iter().copied().collect()),
                default,
            })
        }
    }

    #[async_trait]
    impl Judge for ScriptedJudge {
        async fn evaluate(&self, _answer: &str, _expected: &str) -> Result<Evaluation> {
            let score = self
                .scores
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(self.default);
            Ok(Evaluation {
                score,
                is_correct: score >= 60,
            })
        }
    }

    /// Judge double that marks resume generation complete the first
    /// time an answer is graded, standing in for a producer that
    /// finishes while the interview is already underway.
    struct CompletingJudge {
        bank: Arc<ResumeQuestionBank>,
        score: u8,
    }

    #[async_trait]
    impl Judge for CompletingJudge {
        async fn evaluate(&self, _answer: &str, _expected: &str) -> Result<Evaluation> {
            self.bank.set_generation_complete(true);
            Ok(Evaluation {
                score: self.score,
                is_correct: self.score >= 60,
            })
        }
    }

    struct FixedClassifier {
        topics: Vec<String>,
    }

    impl FixedClassifier {
        fn new(topics: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                topics: topics.iter().map(|t| t.to_string()).collect(),
            })
        }
    }

    #[async_trait]
    impl TopicClassifier for FixedClassifier {
        async fn classify(&self, _text: &str, _threshold: f32) -> Result<Vec<TopicConfidence>> {
            Ok(self
                .topics
                .iter()
                .map(|topic| TopicConfidence {
                    topic: topic.clone(),
                    confidence: 0.9,
                })
                .collect())
        }
    }

    fn java_catalog() -> Arc<QuestionCatalog> {
        let mut catalog = QuestionCatalog::new();
        catalog.add("Java", "What is the JVM?", "Executes bytecode.");
        catalog.add("Java", "Explain garbage collection.", "Automatic memory reclamation.");
        catalog.add("Java", "What are interfaces?", "Behavior contracts.");
        catalog.add("Java", "Explain exceptions.", "Error signalling and handling.");
        Arc::new(catalog)
    }

    fn quick_config() -> InterviewConfig {
        InterviewConfig {
            warmup_cap: 1,
            questions_per_topic: 2,
            mix_round_count: 1,
            coverage_floor: 1,
            ..InterviewConfig::default()
        }
    }

    fn completed_bank() -> Arc<ResumeQuestionBank> {
        let bank = Arc::new(ResumeQuestionBank::new());
        bank.set_generation_complete(true);
        bank
    }

    struct Harness {
        voice: Arc<RecordingVoice>,
        report_path: std::path::PathBuf,
        _dir: tempfile::TempDir,
        interviewer: Interviewer,
    }

    fn harness(
        config: InterviewConfig,
        catalog: Arc<QuestionCatalog>,
        bank: Arc<ResumeQuestionBank>,
        transcripts: &[&str],
        judge: DynJudge,
        classifier_topics: &[&str],
    ) -> Harness {
        let dir = tempfile::tempdir().expect("tempdir");
        let report_path = dir.path().join("feedback.txt");
        let voice = RecordingVoice::new();
        let capture = SyncedCapture::new();
        let interviewer = Interviewer::new(
            config,
            Collaborators {
                voice: voice.clone(),
                capture: capture.clone(),
                transcriber: ScriptedTranscriber::new(transcripts),
                judge,
                classifier: FixedClassifier::new(classifier_topics),
            },
            catalog,
            bank,
            None,
            &report_path,
        );
        capture.attach(interviewer.signals());
        Harness {
            voice,
            report_path,
            _dir: dir,
            interviewer,
        }
    }

    #[tokio::test]
    async fn full_session_produces_a_scored_report() {
        // Two deep-dive questions, one mix question, one checkout.
        let h = harness(
            quick_config(),
            java_catalog(),
            completed_bank(),
            &[
                "I mostly work with Java", // intro, not scored
                "deep dive answer one",
                "deep dive answer two",
                "mix round answer",
                "no questions from me",
            ],
            ScriptedJudge::scripted(&[80, 75, 90, 100], 50),
            &["Java"],
        );
        h.interviewer.run().await.expect("session completes");

        let body = std::fs::read_to_string(&h.report_path).expect("report written");
        assert!(body.contains("Questions answered: 4"));
        // floor((80 + 75 + 90 + 100) / 4) = 86
        assert!(body.contains("FINAL SCORE: 86/100"), "body was:\n{body}");
        assert_eq!(
            body.matches(CHECKOUT_QUESTION).count(),
            1,
            "checkout is asked exactly once"
        );
        let lines = h.voice.lines();
        assert!(lines.iter().any(|l| l == CHECKOUT_QUESTION));
    }

    #[tokio::test]
    async fn stop_phrase_ends_the_session_without_checkout() {
        let h = harness(
            quick_config(),
            java_catalog(),
            completed_bank(),
            &[
                "Java please",
                "a normal answer",
                "please stop interview now",
            ],
            ScriptedJudge::constant(40),
            &["Java"],
        );
        h.interviewer.run().await.expect("session completes");

        let body = std::fs::read_to_string(&h.report_path).expect("report written");
        assert!(!body.contains(CHECKOUT_QUESTION), "stop skips the checkout");
        let lines = h.voice.lines();
        assert!(!lines.iter().any(|l| l == CHECKOUT_QUESTION));
        assert!(lines
            .iter()
            .any(|l| l.contains("end the interview here")));
    }

    #[tokio::test]
    async fn skip_phrase_is_acknowledged_but_still_graded() {
        let h = harness(
            quick_config(),
            java_catalog(),
            completed_bank(),
            &[
                "Java",
                "honestly no idea",
                "a solid answer",
                "mix answer",
                "checkout answer",
            ],
            ScriptedJudge::constant(70),
            &["Java"],
        );
        h.interviewer.run().await.expect("session completes");

        let lines = h.voice.lines();
        assert!(lines.iter().any(|l| l == "No problem, let's move on."));
        let body = std::fs::read_to_string(&h.report_path).expect("report written");
        assert!(body.contains("honestly no idea"), "skipped answer still on the card");
    }

    #[tokio::test]
    async fn keyword_in_an_answer_triggers_a_counter_question() {
        let mut catalog = QuestionCatalog::new();
        catalog.add("Java", "What is the JVM?", "Executes bytecode.");
        catalog.add("Java", "Explain garbage collection.", "Memory reclamation.");
        catalog.add("Java", "What are interfaces?", "Behavior contracts.");
        catalog.add("Python", "Explain threading in Python.", "GIL bound.");
        let config = InterviewConfig {
            questions_per_topic: 3,
            mix_round_count: 0,
            coverage_floor: 1,
            ..InterviewConfig::default()
        };
        let h = harness(
            config,
            Arc::new(catalog),
            completed_bank(),
            &[
                "Java and Python both",
                "I rely on threading for that", // queues the keyword
                "second answer",
                "third answer",
                "fourth answer",
                "checkout answer",
            ],
            ScriptedJudge::constant(60),
            &["Java", "Python"],
        );
        h.interviewer.run().await.expect("session completes");

        let lines = h.voice.lines();
        let counter = lines
            .iter()
            .find(|l| l.ends_with("Explain threading in Python."))
            .expect("counter-question was asked");
        assert!(
            counter.len() > "Explain threading in Python.".len(),
            "counter-question carries a transition prefix: {counter}"
        );
        let body = std::fs::read_to_string(&h.report_path).expect("report written");
        assert!(body.contains("Explain threading in Python."));
    }

    #[tokio::test]
    async fn resume_bank_is_drained_before_the_deep_dive() {
        let bank = Arc::new(ResumeQuestionBank::new());
        bank.add_questions(vec![
            GeneratedQuestion {
                question: "Tell me about your payments project.".to_string(),
                expected_answer: "Design and tradeoffs.".to_string(),
                kind: QuestionKind::Project,
                difficulty: Difficulty::Medium,
                section: "Projects".to_string(),
                keywords: vec![],
            },
            GeneratedQuestion {
                question: "How did you use Kafka at your internship?".to_string(),
                expected_answer: "Event pipeline details.".to_string(),
                kind: QuestionKind::Experience,
                difficulty: Difficulty::Medium,
                section: "Experience".to_string(),
                keywords: vec![],
            },
        ]);
        bank.set_generation_complete(true);

        let h = harness(
            quick_config(),
            java_catalog(),
            bank,
            &[
                "Java",
                "project answer",
                "internship answer",
                "deep dive one",
                "deep dive two",
                "mix answer",
                "checkout answer",
            ],
            ScriptedJudge::constant(65),
            &["Java"],
        );
        h.interviewer.run().await.expect("session completes");

        let body = std::fs::read_to_string(&h.report_path).expect("report written");
        let first_resume = body.find("[Projects]").expect("resume questions on the card");
        let first_local = body.find("[Java]").expect("local questions on the card");
        assert!(first_resume < first_local, "resume round comes first");
        assert!(body.contains("Resume-based: 2"));
    }

    #[tokio::test]
    async fn warmup_holds_until_generation_completes() {
        // The bank already has a question, but the producer is still
        // running: the warmup keeps asking local questions instead of
        // jumping to the resume round early.
        let bank = Arc::new(ResumeQuestionBank::new());
        bank.add_questions(vec![GeneratedQuestion {
            question: "Tell me about your side project.".to_string(),
            expected_answer: "Scope and stack.".to_string(),
            kind: QuestionKind::Project,
            difficulty: Difficulty::Medium,
            section: "Projects".to_string(),
            keywords: vec![],
        }]);

        let config = InterviewConfig {
            warmup_cap: 1,
            questions_per_topic: 1,
            mix_round_count: 0,
            coverage_floor: 1,
            ..InterviewConfig::default()
        };
        // Grading the warmup answer flips the completion latch, as a
        // producer finishing mid-question would.
        let judge = Arc::new(CompletingJudge {
            bank: Arc::clone(&bank),
            score: 70,
        });
        let h = harness(
            config,
            java_catalog(),
            bank,
            &["Java", "warmup answer", "resume answer", "checkout answer"],
            judge,
            &["Java"],
        );
        h.interviewer.run().await.expect("session completes");

        let body = std::fs::read_to_string(&h.report_path).expect("report written");
        let first_local = body.find("[Java]").expect("warmup question on the card");
        let first_resume = body.find("[Projects]").expect("resume question on the card");
        assert!(
            first_local < first_resume,
            "warmup runs while generation is pending, body was:\n{body}"
        );
    }

    #[tokio::test]
    async fn thin_resume_coverage_probes_for_more_topics() {
        let mut catalog = QuestionCatalog::new();
        catalog.add("Java", "What is the JVM?", "Executes bytecode.");
        catalog.add("Python", "What are decorators?", "Function wrappers.");
        let bank = Arc::new(ResumeQuestionBank::new());
        bank.add_questions(vec![GeneratedQuestion {
            question: "Walk me through your one listed project.".to_string(),
            expected_answer: "Scope and role.".to_string(),
            kind: QuestionKind::Project,
            difficulty: Difficulty::Easy,
            section: "Projects".to_string(),
            keywords: vec![],
        }]);
        bank.set_generation_complete(true);

        let config = InterviewConfig {
            warmup_cap: 1,
            questions_per_topic: 1,
            mix_round_count: 0,
            coverage_floor: 5,
            ..InterviewConfig::default()
        };
        // The classifier is fixed, so the probe rediscovers the same
        // topic set; Python enters via intro, Java stays current.
        let h = harness(
            config,
            Arc::new(catalog),
            bank,
            &[
                "Java and Python",
                "project answer",
                "I also did some data tooling", // probe answer
                "jvm answer",
                "decorators answer",
                "checkout answer",
            ],
            ScriptedJudge::constant(55),
            &["Java", "Python"],
        );
        h.interviewer.run().await.expect("session completes");

        let lines = h.voice.lines();
        assert!(lines.iter().any(|l| l == COVERAGE_PROBE));
        let body = std::fs::read_to_string(&h.report_path).expect("report written");
        assert!(body.contains("Topics covered: Java, Python"));
    }

    #[tokio::test]
    async fn unknown_intro_falls_back_to_the_default_topic() {
        let config = InterviewConfig {
            warmup_cap: 1,
            questions_per_topic: 1,
            mix_round_count: 0,
            coverage_floor: 1,
            ..InterviewConfig::default()
        };
        let h = harness(
            config,
            java_catalog(),
            completed_bank(),
            &["I do underwater basket weaving", "an answer", "checkout answer"],
            ScriptedJudge::constant(50),
            // Classifier names a topic the catalog doesn't carry.
            &["Haskell"],
        );
        h.interviewer.run().await.expect("session completes");

        let body = std::fs::read_to_string(&h.report_path).expect("report written");
        assert!(body.contains("Topics covered: Java"));
        assert!(body.contains("[Java]"));
    }
}
