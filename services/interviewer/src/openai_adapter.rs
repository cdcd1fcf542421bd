//! OpenAI-backed collaborators: chat-completions for judging, topic
//! classification and resume question generation, and Whisper for
//! speech-to-text.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::io::Cursor;

use interviewer_core::bank::ResumeQuestionSet;
use interviewer_core::collaborators::{
    Evaluation, Judge, ResumeQuestionGenerator, TopicClassifier, TopicConfidence, Transcriber,
};
use interviewer_core::resume::ResumeProfile;

use crate::config::CAPTURE_SAMPLE_RATE;

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const TRANSCRIPTIONS_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Answers shorter than this are scored zero without a network call.
const MIN_ANSWER_CHARS: usize = 5;

#[derive(Debug, Deserialize)]
struct LlmResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Debug, Deserialize)]
struct Message {
    content: String,
}

#[derive(Debug, Deserialize)]
struct EvaluationOut {
    score: u8,
    is_correct: bool,
}

#[derive(Debug, Deserialize)]
struct ClassificationOut {
    topics: Vec<TopicOut>,
}

#[derive(Debug, Deserialize)]
struct TopicOut {
    topic: String,
    confidence: f32,
}

/// One chat-completions client serving every LLM-backed collaborator
/// role. The known topic list is baked in at construction so
/// classification can only ever name topics the catalog carries.
pub struct ChatClient {
    client: Client,
    api_key: String,
    model: String,
    known_topics: Vec<String>,
}

impl ChatClient {
    pub fn new(api_key: String, model: String, known_topics: Vec<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            known_topics,
        }
    }

    /// Single-prompt JSON-mode completion; returns the raw message
    /// content for the caller to deserialize.
    async fn chat_json(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "response_format": { "type": "json_object" },
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        let resp = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()
            .context("chat completion request rejected")?
            .json::<LlmResponse>()
            .await?;

        let answer = resp
            .choices
            .first()
            .ok_or_else(|| anyhow::anyhow!("No response from LLM"))?
            .message
            .content
            .clone();
        Ok(answer)
    }
}

#[async_trait]
impl Judge for ChatClient {
    async fn evaluate(&self, answer: &str, expected: &str) -> Result<Evaluation> {
        if answer.trim().chars().count() < MIN_ANSWER_CHARS {
            return Ok(Evaluation {
                score: 0,
                is_correct: false,
            });
        }
        let prompt = format!(
            "You are grading one interview answer.\n\
             Expected answer: \"{expected}\"\n\
             Candidate's answer: \"{answer}\"\n\
             Score the candidate's answer from 0 to 100 for technical accuracy and \
             completeness against the expected answer. Partial credit is fine.\n\
             Respond as JSON: {{\"score\": <0-100>, \"is_correct\": <true if score >= 60>}}"
        );
        let content = self.chat_json(&prompt).await?;
        let parsed: EvaluationOut =
            serde_json::from_str(&content).context("malformed evaluation JSON")?;
        Ok(Evaluation {
            score: parsed.score.min(100),
            is_correct: parsed.is_correct,
        })
    }
}

#[async_trait]
impl TopicClassifier for ChatClient {
    async fn classify(&self, text: &str, threshold: f32) -> Result<Vec<TopicConfidence>> {
        let prompt = format!(
            "A candidate introduced themselves in a technical interview:\n\"{text}\"\n\
             Which of these topics do they claim experience with: {}?\n\
             Respond as JSON: {{\"topics\": [{{\"topic\": <exact topic name>, \
             \"confidence\": <0.0-1.0>}}]}}. Only include topics from the list.",
            self.known_topics.join(", ")
        );
        let content = self.chat_json(&prompt).await?;
        let parsed: ClassificationOut =
            serde_json::from_str(&content).context("malformed classification JSON")?;
        let mut topics: Vec<TopicConfidence> = parsed
            .topics
            .into_iter()
            .filter(|t| t.confidence >= threshold && self.known_topics.contains(&t.topic))
            .map(|t| TopicConfidence {
                topic: t.topic,
                confidence: t.confidence,
            })
            .collect();
        topics.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        Ok(topics)
    }
}

#[async_trait]
impl ResumeQuestionGenerator for ChatClient {
    async fn generate(&self, profile: &ResumeProfile, target: usize) -> Result<ResumeQuestionSet> {
        let prompt = format!(
            "Generate {target} technical interview questions from this resume.\n\
             Skills: {}\nProjects: {}\nExperience: {}\nInternships: {}\n\
             Mix difficulties (easy, medium, hard) and types (theoretical, conceptual, \
             scenario, puzzle, behavioral, project, experience).\n\
             Respond as JSON: {{\"summary\": <two-sentence profile summary>, \
             \"questions\": [{{\"question\": <string>, \"expected_answer\": <string>, \
             \"type\": <type>, \"difficulty\": <difficulty>, \"section\": <resume section>, \
             \"keywords\": [<strings>]}}]}}",
            profile.skills.join(", "),
            profile.projects.join("; "),
            profile.experience.join("; "),
            profile.internships.join("; "),
        );
        let content = self.chat_json(&prompt).await?;
        let set: ResumeQuestionSet =
            serde_json::from_str(&content).context("malformed question set JSON")?;
        Ok(set)
    }
}

/// Whisper speech-to-text over the audio transcriptions endpoint.
/// Recordings are uploaded as an in-memory 16 kHz mono WAV.
pub struct WhisperTranscriber {
    client: Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptionOut {
    text: String,
}

impl WhisperTranscriber {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, samples: &[f32]) -> Result<String> {
        if samples.is_empty() {
            return Ok(String::new());
        }
        let wav = encode_wav(samples)?;

        let part = reqwest::multipart::Part::bytes(wav)
            .file_name("answer.wav")
            .mime_str("audio/wav")
            .context("invalid mime type")?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone());

        let resp = self
            .client
            .post(TRANSCRIPTIONS_URL)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?
            .error_for_status()
            .context("transcription request rejected")?
            .json::<TranscriptionOut>()
            .await?;
        Ok(resp.text.trim().to_string())
    }
}

/// 16-bit PCM mono WAV at the capture rate, built in memory.
fn encode_wav(samples: &[f32]) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: CAPTURE_SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).context("creating WAV writer")?;
        for &sample in samples {
            let clamped = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(clamped).context("writing WAV sample")?;
        }
        writer.finalize().context("finalizing WAV")?;
    }
    Ok(cursor.into_inner())
}
