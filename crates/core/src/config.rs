//! Tunable interview constants.
//!
//! Pacing and threshold values are kept as named, overridable
//! configuration rather than scattered literals.

/// Interview pacing and threshold knobs, with the historical defaults.
#[derive(Debug, Clone)]
pub struct InterviewConfig {
    /// Local questions asked while the resume bank is still filling.
    pub warmup_cap: usize,
    /// Questions per topic during the deep dive.
    pub questions_per_topic: usize,
    /// Questions asked in the final mixed round.
    pub mix_round_count: usize,
    /// Minimum resume questions before the bank counts as covered;
    /// below this the "what else" probe fires on exhaustion.
    pub coverage_floor: usize,
    /// How many resume questions to request from the generator.
    pub resume_target: usize,
    /// Confidence threshold for intro topic classification.
    pub classify_threshold: f32,
    /// Topic used when classification clears nothing.
    pub fallback_topic: String,
    /// Entries scoring below this are read back as verbal feedback.
    pub weak_score_threshold: u8,
    /// At most this many weak answers are read back.
    pub verbal_feedback_limit: usize,
}

impl Default for InterviewConfig {
    fn default() -> Self {
        Self {
            warmup_cap: 3,
            questions_per_topic: 5,
            mix_round_count: 3,
            coverage_floor: 15,
            resume_target: 20,
            classify_threshold: 0.3,
            fallback_topic: "Java".to_string(),
            weak_score_threshold: 30,
            verbal_feedback_limit: 3,
        }
    }
}
