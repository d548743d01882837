//! Client for the Bastion-hosted Orpheus model.

use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::error::AppError;
use crate::generation::GenerationRequest;
use crate::prompt;

#[derive(Debug, Serialize, PartialEq)]
pub struct GeneratePayload {
    pub text: String,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
    pub max_tokens: u32,
}

impl GeneratePayload {
    pub fn from_request(request: &GenerationRequest) -> Self {
        Self {
            text: prompt::format_remote_text(request.voice, &request.text, &request.emotion_tags),
            temperature: request.temperature,
            top_p: request.top_p,
            repetition_penalty: request.repetition_penalty,
            max_tokens: request.max_tokens,
        }
    }
}

pub struct BastionClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl BastionClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let http = Client::builder().timeout(config.bastion_timeout).build()?;

        Ok(Self {
            http,
            base_url: config.bastion_url.trim_end_matches('/').to_string(),
            api_key: config.bastion_api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Single attempt. The response body is returned as-is, never interpreted.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<Value, AppError> {
        let payload = GeneratePayload::from_request(request);
        let url = format!("{}/generate", self.base_url);

        tracing::info!(voice = %request.voice, %url, "Sending generation request");

        let mut builder = self.http.post(&url).json(&payload);
        if let Some(key) = &self.api_key {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", key));
        }

        let response = builder.send().await?.error_for_status()?;
        let body = response.json::<Value>().await?;

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::Voice;
    use mockito::Matcher;
    use serde_json::json;

    fn client_for(url: &str, key: Option<&str>) -> BastionClient {
        let config = Config {
            bastion_url: url.to_string(),
            bastion_api_key: key.map(str::to_string),
            ..Config::default()
        };
        BastionClient::new(&config).unwrap()
    }

    #[test]
    fn payload_embeds_voice_and_emotions_in_text() {
        let request = GenerationRequest::new("Hello", Voice::Mia).with_emotions(["laugh"]);
        let payload = GeneratePayload::from_request(&request);
        assert_eq!(payload.text, "mia: <laugh> Hello");
        assert_eq!(payload.max_tokens, 4096);

        let value = serde_json::to_value(&payload).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 5);
        assert!(value.get("voice").is_none());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client = client_for("http://example.test/orpheus/", None);
        assert_eq!(client.base_url(), "http://example.test/orpheus");
    }

    #[tokio::test]
    async fn success_body_is_returned_unmodified() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/generate")
            .match_body(Matcher::PartialJson(json!({
                "text": "tara: Hi there",
                "max_tokens": 4096
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"audio_url": "x"}"#)
            .create_async()
            .await;

        let client = client_for(&server.url(), None);
        let result = client
            .generate(&GenerationRequest::new("Hi there", Voice::Tara))
            .await
            .unwrap();

        assert_eq!(result, json!({"audio_url": "x"}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn bearer_header_sent_when_key_configured() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/generate")
            .match_header("authorization", "Bearer secret")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = client_for(&server.url(), Some("secret"));
        client
            .generate(&GenerationRequest::new("Hi", Voice::Zac))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn no_authorization_header_without_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/generate")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let client = client_for(&server.url(), None);
        client
            .generate(&GenerationRequest::new("Hi", Voice::Zac))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_error_becomes_failure_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/generate")
            .with_status(500)
            .with_body("boom")
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server.url(), None);
        let err = client
            .generate(&GenerationRequest::new("Hi", Voice::Tara))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Http(_)));
        assert!(!err.to_string().is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_json_body_is_a_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/generate")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = client_for(&server.url(), None);
        let result = client
            .generate(&GenerationRequest::new("Hi", Voice::Tara))
            .await;
        assert!(result.is_err());
    }
}
