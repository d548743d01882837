//! Orpheus served by a local LM Studio style completion endpoint, with audio
//! tokens decoded by the SNAC codec.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use hound::{SampleFormat, WavSpec, WavWriter};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use super::snac::{self, SnacCodes, SnacDecoder};
use super::{AudioSegment, SpeechBackend, SynthesisJob};
use crate::config::Config;
use crate::error::AppError;

const AUDIO_START: &str = "<|audio|>";
const AUDIO_END: &str = "<|eot_id|>";

/// Token ids per SNAC frame.
const FRAME_LEN: usize = 7;
/// Ids decoded together: four frames, advancing one frame at a time.
const WINDOW_LEN: usize = 28;
const CODEBOOK_SIZE: i64 = 4096;
const TOKEN_OFFSET: i64 = 10;

lazy_static! {
    static ref CUSTOM_TOKEN: Regex = Regex::new(r"<custom_token_(\d+)>").unwrap();
}

pub fn format_prompt(voice: &str, text: &str) -> String {
    format!("{}{}: {}{}", AUDIO_START, voice, text, AUDIO_END)
}

/// Extract audio code ids from raw model output.
///
/// Each `<custom_token_N>` maps to `N - 10 - (i % 7) * 4096`, where `i` is the
/// number of ids accepted so far. Non-positive ids are dropped and do not
/// advance `i`.
pub fn parse_audio_tokens(text: &str) -> Vec<i64> {
    let mut ids = Vec::new();

    for cap in CUSTOM_TOKEN.captures_iter(text) {
        let Ok(raw) = cap[1].parse::<i64>() else {
            continue;
        };
        let position = (ids.len() % FRAME_LEN) as i64;
        let id = raw - TOKEN_OFFSET - position * CODEBOOK_SIZE;
        if id > 0 {
            ids.push(id);
        }
    }

    ids
}

/// Split whole frames into SNAC layers. Returns `None` when no full frame is
/// present or any code falls outside the codebook.
pub fn frames_to_codes(ids: &[i64]) -> Option<SnacCodes> {
    let mut codes = SnacCodes::default();

    for frame in ids.chunks_exact(FRAME_LEN) {
        codes.layer0.push(frame[0]);
        codes.layer1.extend([frame[1], frame[4]]);
        codes.layer2.extend([frame[2], frame[3], frame[5], frame[6]]);
    }

    if codes.frames() == 0 {
        return None;
    }

    let in_range = |c: &i64| (0..=CODEBOOK_SIZE).contains(c);
    if !codes.layer0.iter().all(in_range)
        || !codes.layer1.iter().all(in_range)
        || !codes.layer2.iter().all(in_range)
    {
        return None;
    }

    Some(codes)
}

/// Windows decoded as the stream grows: once more than 27 ids have arrived,
/// every 7th id closes a window over the last 28.
pub fn audio_windows(ids: &[i64]) -> impl Iterator<Item = &[i64]> {
    (WINDOW_LEN..=ids.len())
        .step_by(FRAME_LEN)
        .map(move |end| &ids[end - WINDOW_LEN..end])
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: String,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    repeat_penalty: f32,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

pub struct OrpheusBackend {
    http: Client,
    completions_url: String,
    model: String,
    snac_model_path: PathBuf,
    decoder: OnceCell<Arc<SnacDecoder>>,
}

impl OrpheusBackend {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = Client::builder().timeout(config.local_timeout).build()?;

        Ok(Self {
            http,
            completions_url: format!(
                "{}/v1/completions",
                config.local_api_url.trim_end_matches('/')
            ),
            model: config.orpheus_model.clone(),
            snac_model_path: config.snac_model_path.clone(),
            decoder: OnceCell::new(),
        })
    }

    async fn complete(&self, job: &SynthesisJob<'_>) -> Result<String, AppError> {
        let request = CompletionRequest {
            model: &self.model,
            prompt: format_prompt(job.voice.as_str(), job.prompt),
            max_tokens: job.max_tokens,
            temperature: job.temperature,
            top_p: job.top_p,
            repeat_penalty: job.repetition_penalty,
            stream: false,
        };

        let response = self
            .http
            .post(&self.completions_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Backend(format!(
                "API request failed with status {}: {}",
                status, body
            )));
        }

        let body: CompletionResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| AppError::Backend("Completion response contained no choices".into()))
    }

    async fn decoder(&self) -> Result<Arc<SnacDecoder>, AppError> {
        let decoder = self
            .decoder
            .get_or_try_init(|| async { SnacDecoder::load(&self.snac_model_path).map(Arc::new) })
            .await?;
        Ok(Arc::clone(decoder))
    }
}

#[async_trait]
impl SpeechBackend for OrpheusBackend {
    async fn synthesize(
        &self,
        job: &SynthesisJob<'_>,
    ) -> Result<Option<Vec<AudioSegment>>, AppError> {
        let output = self.complete(job).await?;
        let ids = parse_audio_tokens(&output);
        tracing::debug!(tokens = ids.len(), "Parsed audio tokens");

        let decoder = if ids.len() >= WINDOW_LEN {
            Some(self.decoder().await?)
        } else {
            None
        };

        // Decoding and file writes are blocking work.
        let output_path = job.output_path.to_path_buf();
        let segments =
            tokio::task::spawn_blocking(move || write_wav(decoder.as_deref(), &ids, &output_path))
                .await
                .map_err(|e| AppError::Backend(format!("Synthesis task failed: {}", e)))??;

        Ok(Some(segments))
    }
}

/// Decode every window into `output_path`, returning the segments written.
fn write_wav(
    decoder: Option<&SnacDecoder>,
    ids: &[i64],
    output_path: &Path,
) -> Result<Vec<AudioSegment>, AppError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: snac::SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(output_path, spec)
        .map_err(|e| AppError::Backend(format!("Failed to create WAV writer: {}", e)))?;

    let mut segments = Vec::new();
    if let Some(decoder) = decoder {
        for window in audio_windows(ids) {
            let Some(codes) = frames_to_codes(window) else {
                continue;
            };
            let pcm = snac::window_to_pcm(&decoder.decode(&codes)?);
            if pcm.is_empty() {
                continue;
            }
            for sample in &pcm {
                writer
                    .write_sample(*sample)
                    .map_err(|e| AppError::Backend(format!("Failed to write sample: {}", e)))?;
            }
            segments.push(AudioSegment { samples: pcm });
        }
    }

    writer
        .finalize()
        .map_err(|e| AppError::Backend(format!("Failed to finalize WAV: {}", e)))?;

    Ok(segments)
}
