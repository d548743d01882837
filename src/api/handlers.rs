use axum::{extract::State, response::Html, Json};
use std::sync::Arc;

use super::{present, ConfigResponse, GenerateForm, GenerateResponse, HealthResponse, OptionsResponse};
use crate::api::routes::{AppState, Generator};
use crate::error::AppError;
use crate::local::AvailabilityStatus;

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Runs one generation. Every outcome, including failures, becomes a status string.
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(form): Json<GenerateForm>,
) -> Json<GenerateResponse> {
    let request = form.into_request(&state.config.defaults);

    if let Err(e) = request.ensure_text() {
        return Json(present::failure(e));
    }

    let response = match &state.generator {
        Generator::Remote(client) => {
            present::remote(request.voice, client.generate(&request).await)
        }
        Generator::Local(generator) => present::local(generator.generate(&request, None).await),
    };

    tracing::info!("{}", response.status);

    Json(response)
}

/// Same generation for scripted callers: failures surface as HTTP errors.
pub async fn generate_raw(
    State(state): State<Arc<AppState>>,
    Json(form): Json<GenerateForm>,
) -> Result<Json<serde_json::Value>, AppError> {
    let request = form.into_request(&state.config.defaults);
    request.ensure_text()?;

    let body = match &state.generator {
        Generator::Remote(client) => client.generate(&request).await?,
        Generator::Local(generator) => {
            let generation = generator.generate(&request, None).await?;
            serde_json::to_value(&generation)
                .map_err(|e| AppError::Backend(format!("Failed to encode result: {}", e)))?
        }
    };

    Ok(Json(body))
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<AvailabilityStatus> {
    let status = match &state.generator {
        Generator::Local(generator) => generator.check().await,
        Generator::Remote(_) => AvailabilityStatus {
            available: true,
            message: "Remote backend".to_string(),
        },
    };
    Json(status)
}

pub async fn options(State(state): State<Arc<AppState>>) -> Json<OptionsResponse> {
    Json(OptionsResponse::new(&state.config.defaults))
}

pub async fn config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    let response = match &state.generator {
        Generator::Remote(client) => ConfigResponse {
            variant: "remote",
            backend_url: client.base_url().to_string(),
            api_key_configured: state.config.api_key_configured(),
        },
        Generator::Local(_) => ConfigResponse {
            variant: "local",
            backend_url: state.config.local_api_url.clone(),
            api_key_configured: false,
        },
    };
    Json(response)
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
