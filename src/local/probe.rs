use reqwest::{Client, StatusCode};
use serde::Serialize;

use crate::config::Config;

pub const AVAILABLE_MESSAGE: &str = "LM Studio is running";
pub const UNAVAILABLE_MESSAGE: &str =
    "LM Studio is not running. Start LM Studio and load the Orpheus model on 127.0.0.1:1234.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvailabilityStatus {
    pub available: bool,
    pub message: String,
}

/// Why a health check failed. Callers only ever see the collapsed status.
#[derive(thiserror::Error, Debug)]
pub enum ProbeError {
    #[error("connection refused")]
    Refused,

    #[error("timed out")]
    Timeout,

    #[error("unexpected status {0}")]
    Status(StatusCode),

    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout
        } else if err.is_connect() {
            ProbeError::Refused
        } else {
            ProbeError::Transport(err.to_string())
        }
    }
}

pub struct AvailabilityProber {
    http: Client,
    models_url: String,
}

impl AvailabilityProber {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.probe_timeout).build()?;
        Ok(Self {
            http,
            models_url: format!("{}/v1/models", config.local_api_url.trim_end_matches('/')),
        })
    }

    pub async fn probe(&self) -> Result<(), ProbeError> {
        let response = self.http.get(&self.models_url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(()),
            other => Err(ProbeError::Status(other)),
        }
    }

    pub async fn check(&self) -> AvailabilityStatus {
        match self.probe().await {
            Ok(()) => AvailabilityStatus {
                available: true,
                message: AVAILABLE_MESSAGE.to_string(),
            },
            Err(e) => {
                tracing::debug!(url = %self.models_url, error = %e, "Local model probe failed");
                AvailabilityStatus {
                    available: false,
                    message: UNAVAILABLE_MESSAGE.to_string(),
                }
            }
        }
    }
}
