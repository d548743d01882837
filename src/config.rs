use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::prompt::Voice;

pub const DEFAULT_BASTION_URL: &str = "https://bastion.example.com/orpheus";
pub const DEFAULT_LOCAL_API_URL: &str = "http://127.0.0.1:1234";

/// Sampling parameters the UI starts from and that fill in missing request fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingDefaults {
    pub voice: Voice,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
    pub max_tokens: u32,
}

impl Default for SamplingDefaults {
    fn default() -> Self {
        Self {
            voice: Voice::Tara,
            temperature: 0.9,
            top_p: 0.95,
            repetition_penalty: 1.1,
            max_tokens: 4096,
        }
    }
}

/// Process-wide settings, built once at startup and shared by `Arc`.
#[derive(Debug, Clone)]
pub struct Config {
    pub bastion_url: String,
    pub bastion_api_key: Option<String>,
    pub bastion_timeout: Duration,
    pub local_api_url: String,
    pub probe_timeout: Duration,
    pub local_timeout: Duration,
    pub orpheus_model: String,
    pub snac_model_path: PathBuf,
    pub outputs_dir: PathBuf,
    pub defaults: SamplingDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bastion_url: DEFAULT_BASTION_URL.to_string(),
            bastion_api_key: None,
            bastion_timeout: Duration::from_secs(60),
            local_api_url: DEFAULT_LOCAL_API_URL.to_string(),
            probe_timeout: Duration::from_secs(2),
            local_timeout: Duration::from_secs(300),
            orpheus_model: "orpheus-3b-0.1-ft".to_string(),
            snac_model_path: PathBuf::from("models/snac_24khz_decoder.onnx"),
            outputs_dir: PathBuf::from("outputs"),
            defaults: SamplingDefaults::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source. Unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // An empty key means "not configured", the Authorization header is omitted.
        let bastion_api_key = lookup("BASTION_API_KEY").filter(|k| !k.is_empty());

        Self {
            bastion_url: lookup("BASTION_URL").unwrap_or(defaults.bastion_url),
            bastion_api_key,
            local_api_url: lookup("LOCAL_API_URL").unwrap_or(defaults.local_api_url),
            orpheus_model: lookup("ORPHEUS_MODEL").unwrap_or(defaults.orpheus_model),
            snac_model_path: lookup("SNAC_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.snac_model_path),
            outputs_dir: lookup("OUTPUTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.outputs_dir),
            ..defaults
        }
    }

    pub fn api_key_configured(&self) -> bool {
        self.bastion_api_key.is_some()
    }
}
