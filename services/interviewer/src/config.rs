//! Application configuration.
//!
//! Settings are loaded from environment variables (with `.env` support
//! for local development) into a single shareable struct.

use std::env;
use tracing::Level;

/// Microphone sample rate requested for answer capture. Whisper accepts
/// 16 kHz mono WAV directly, so recordings are resampled to this rate
/// before upload.
pub const CAPTURE_SAMPLE_RATE: u32 = 16_000;

/// The size of each audio chunk taken from the microphone input stream.
pub const INPUT_CHUNK_SIZE: usize = 1024;

/// Holds all configuration loaded from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub chat_model: String,
    pub transcribe_model: String,
    pub report_path: String,
    pub log_level: Level,
}

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid log level provided for RUST_LOG: {0}")]
    InvalidLogLevel(String),
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    // *   `OPENAI_API_KEY`: Your secret key for the OpenAI API. Required.
    // *   `CHAT_MODEL`: (Optional) Model used for judging, classification and
    //     resume question generation. Defaults to "gpt-4o".
    // *   `TRANSCRIBE_MODEL`: (Optional) Speech-to-text model. Defaults to "whisper-1".
    // *   `REPORT_PATH`: (Optional) Where the feedback report is written.
    //     Defaults to "interview_feedback.txt".
    // *   `RUST_LOG`: (Optional) The logging level. Defaults to "INFO".
    pub fn from_env() -> Result<Self, ConfigError> {
        // Ignored if no .env file is present.
        dotenvy::dotenv().ok();

        let openai_api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;

        let chat_model = env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let transcribe_model =
            env::var("TRANSCRIBE_MODEL").unwrap_or_else(|_| "whisper-1".to_string());
        let report_path =
            env::var("REPORT_PATH").unwrap_or_else(|_| "interview_feedback.txt".to_string());

        let log_level_str = env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str
            .parse::<Level>()
            .map_err(|_| ConfigError::InvalidLogLevel(log_level_str))?;

        Ok(Self {
            openai_api_key,
            chat_model,
            transcribe_model,
            report_path,
            log_level,
        })
    }
}
