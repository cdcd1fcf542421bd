//! Console narration and push-to-stop microphone capture.

use anyhow::{Context, Result};
use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FrameCount, StreamConfig};
use rubato::{FastFixedIn, PolynomialDegree, Resampler};
use std::sync::{Arc, Mutex};

use interviewer_core::collaborators::{SpeechCapture, SpeechSynthesizer};

use crate::config::{CAPTURE_SAMPLE_RATE, INPUT_CHUNK_SIZE};

/// Prints interviewer lines to the terminal.
pub struct ConsoleVoice;

#[async_trait]
impl SpeechSynthesizer for ConsoleVoice {
    async fn speak(&self, text: &str) -> Result<()> {
        println!("\nINTERVIEWER: {text}");
        Ok(())
    }
}

/// Records from the default input device until the user presses Enter.
///
/// `cpal` streams are not `Send`, so the whole capture (stream setup,
/// the blocking stdin read, teardown) runs on one blocking thread.
pub struct MicCapture;

#[async_trait]
impl SpeechCapture for MicCapture {
    async fn record(&self) -> Result<Vec<f32>> {
        tokio::task::spawn_blocking(capture_until_enter)
            .await
            .context("capture task panicked")?
    }
}

fn capture_until_enter() -> Result<Vec<f32>> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .context("no default audio input device")?;
    let input_config = device
        .default_input_config()
        .context("failed to get default input config")?;
    let channel_count = input_config.channels() as usize;
    let device_rate = input_config.sample_rate().0;

    let stream_config = StreamConfig {
        channels: input_config.channels(),
        sample_rate: input_config.sample_rate(),
        buffer_size: cpal::BufferSize::Fixed(FrameCount::from(INPUT_CHUNK_SIZE as u32)),
    };

    let captured = Arc::new(Mutex::new(Vec::<f32>::new()));
    let sink = Arc::clone(&captured);
    // Mix multi-channel input down to mono as it arrives.
    let input_data_fn = move |data: &[f32], _: &cpal::InputCallbackInfo| {
        let mut sink = match sink.lock() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        };
        if channel_count > 1 {
            sink.extend(
                data.chunks(channel_count)
                    .map(|c| c.iter().sum::<f32>() / channel_count as f32),
            );
        } else {
            sink.extend_from_slice(data);
        }
    };

    let stream = device
        .build_input_stream(
            &stream_config,
            input_data_fn,
            move |err| tracing::error!("An error occurred on input stream: {}", err),
            None,
        )
        .context("failed to build input stream")?;
    stream.play().context("failed to start input stream")?;

    println!("(Recording... press Enter when you're done.)");
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .context("failed to read stdin")?;
    drop(stream);

    let samples = match Arc::try_unwrap(captured) {
        Ok(mutex) => mutex.into_inner().unwrap_or_else(|e| e.into_inner()),
        Err(shared) => shared.lock().unwrap_or_else(|e| e.into_inner()).clone(),
    };
    tracing::debug!(
        samples = samples.len(),
        device_rate,
        "recording finished"
    );
    resample_to_capture_rate(samples, device_rate)
}

/// Converts device-rate audio to the fixed capture rate the
/// transcription upload expects.
fn resample_to_capture_rate(samples: Vec<f32>, input_rate: u32) -> Result<Vec<f32>> {
    if samples.is_empty() || input_rate == CAPTURE_SAMPLE_RATE {
        return Ok(samples);
    }
    let mut resampler = FastFixedIn::<f32>::new(
        f64::from(CAPTURE_SAMPLE_RATE) / f64::from(input_rate),
        1.0,
        PolynomialDegree::Cubic,
        INPUT_CHUNK_SIZE,
        1,
    )
    .context("failed to create resampler")?;

    let mut out = Vec::with_capacity(
        samples.len() * CAPTURE_SAMPLE_RATE as usize / input_rate as usize + INPUT_CHUNK_SIZE,
    );
    for chunk in samples.chunks(INPUT_CHUNK_SIZE) {
        // The resampler wants full chunks; the tail is zero-padded.
        let mut chunk = chunk.to_vec();
        chunk.resize(INPUT_CHUNK_SIZE, 0.0);
        let resampled = resampler
            .process(&[chunk.as_slice()], None)
            .context("resampling failed")?;
        if let Some(channel) = resampled.first() {
            out.extend_from_slice(channel);
        }
    }
    Ok(out)
}
