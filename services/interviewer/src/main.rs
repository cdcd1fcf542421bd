mod config;
mod openai_adapter;
mod speech;

use crate::config::Config;
use crate::openai_adapter::{ChatClient, WhisperTranscriber};
use crate::speech::{ConsoleVoice, MicCapture};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::fmt::time::ChronoLocal;

use interviewer_core::bank::ResumeQuestionBank;
use interviewer_core::catalog::QuestionCatalog;
use interviewer_core::collaborators::{DynResumeQuestionGenerator, ResumeQuestionGenerator};
use interviewer_core::resume::{parse_resume_text, synthesize_fallback, ResumeProfile};
use interviewer_core::{Collaborators, Interviewer, InterviewConfig};

#[derive(Parser)]
#[command(about = "Voice-driven mock technical interviewer")]
struct Cli {
    /// Path to a plain-text resume; enables the resume-driven rounds
    #[arg(long)]
    resume: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load application configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .init();

    tracing::info!("Configuration loaded successfully. Starting interviewer service...");

    // --- 3. Parse Command-Line Arguments ---
    let args = Cli::parse();

    let interview_config = InterviewConfig::default();
    let catalog = Arc::new(QuestionCatalog::with_defaults());
    let bank = Arc::new(ResumeQuestionBank::new());

    // --- 4. Initialize API Clients ---
    let chat = Arc::new(ChatClient::new(
        config.openai_api_key.clone(),
        config.chat_model.clone(),
        catalog.topics().to_vec(),
    ));
    let transcriber = Arc::new(WhisperTranscriber::new(
        config.openai_api_key.clone(),
        config.transcribe_model.clone(),
    ));

    // --- 5. Resume Producer ---
    // Question generation runs in the background; the session warms up
    // on local questions until the bank fills.
    let resume_profile = match &args.resume {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading resume from {}", path.display()))?;
            let profile = parse_resume_text(&text);
            if profile.is_empty() {
                tracing::warn!("resume parsed to nothing usable, skipping resume rounds");
                bank.set_generation_complete(true);
                None
            } else {
                spawn_resume_producer(
                    chat.clone(),
                    profile.clone(),
                    Arc::clone(&bank),
                    interview_config.resume_target,
                );
                Some(profile)
            }
        }
        None => {
            bank.set_generation_complete(true);
            None
        }
    };

    // --- 6. Run the Session ---
    let interviewer = Interviewer::new(
        interview_config,
        Collaborators {
            voice: Arc::new(ConsoleVoice),
            capture: Arc::new(MicCapture),
            transcriber,
            judge: chat.clone(),
            classifier: chat,
        },
        catalog,
        bank,
        resume_profile,
        config.report_path.clone(),
    );

    // Ctrl-C requests a graceful stop; the loop notices it at the next
    // question boundary and still writes the report.
    let signals = interviewer.signals();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, requesting stop");
            signals.request_stop().await;
        }
    });

    interviewer.run().await
}

/// Fill the bank from the generator, falling back to questions
/// synthesized directly from the parsed resume when the model call
/// fails or returns nothing. Always marks generation complete.
fn spawn_resume_producer(
    generator: DynResumeQuestionGenerator,
    profile: ResumeProfile,
    bank: Arc<ResumeQuestionBank>,
    target: usize,
) {
    tokio::spawn(async move {
        let questions = match generator.generate(&profile, target).await {
            Ok(set) if !set.questions.is_empty() => set.questions,
            Ok(_) => {
                tracing::warn!("generator returned no questions, synthesizing from resume");
                synthesize_fallback(&profile).questions
            }
            Err(e) => {
                tracing::warn!("resume question generation failed: {e:#}");
                synthesize_fallback(&profile).questions
            }
        };
        let added = bank.add_questions(questions);
        tracing::info!(added, "resume question bank filled");
        bank.set_generation_complete(true);
    });
}
