pub mod handlers;
pub mod present;
pub mod routes;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::SamplingDefaults;
use crate::generation::GenerationRequest;
use crate::prompt::{Emotion, Voice};

/// Body of `POST /api/generate`. Missing fields fall back to the configured defaults.
#[derive(Debug, Deserialize)]
pub struct GenerateForm {
    pub text: String,
    pub voice: Option<Voice>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub repetition_penalty: Option<f32>,
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub emotion_tags: Vec<String>,
}

impl GenerateForm {
    pub fn into_request(self, defaults: &SamplingDefaults) -> GenerationRequest {
        GenerationRequest {
            text: self.text,
            voice: self.voice.unwrap_or(defaults.voice),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            top_p: self.top_p.unwrap_or(defaults.top_p),
            repetition_penalty: self.repetition_penalty.unwrap_or(defaults.repetition_penalty),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            emotion_tags: self.emotion_tags,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct GenerateResponse {
    pub status: String,
    pub response: Option<Value>,
    pub audio_url: Option<String>,
}

impl GenerateResponse {
    pub fn status_only(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
            response: None,
            audio_url: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SliderRange {
    pub min: f32,
    pub max: f32,
    pub step: f32,
    pub value: f32,
}

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub voices: Vec<Voice>,
    pub emotions: Vec<Emotion>,
    pub default_voice: Voice,
    pub temperature: SliderRange,
    pub top_p: SliderRange,
    pub repetition_penalty: SliderRange,
    pub max_tokens: SliderRange,
}

impl OptionsResponse {
    pub fn new(defaults: &SamplingDefaults) -> Self {
        Self {
            voices: Voice::ALL.to_vec(),
            emotions: Emotion::ALL.to_vec(),
            default_voice: defaults.voice,
            temperature: SliderRange {
                min: 0.1,
                max: 2.0,
                step: 0.1,
                value: defaults.temperature,
            },
            top_p: SliderRange {
                min: 0.1,
                max: 1.0,
                step: 0.05,
                value: defaults.top_p,
            },
            repetition_penalty: SliderRange {
                min: 1.0,
                max: 2.0,
                step: 0.05,
                value: defaults.repetition_penalty,
            },
            max_tokens: SliderRange {
                min: 256.0,
                max: 8192.0,
                step: 256.0,
                value: defaults.max_tokens as f32,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub variant: &'static str,
    pub backend_url: String,
    pub api_key_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
