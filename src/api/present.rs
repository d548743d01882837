use serde_json::Value;

use crate::error::AppError;
use crate::local::LocalGeneration;
use crate::prompt::Voice;

use super::GenerateResponse;

pub fn remote(voice: Voice, result: Result<Value, AppError>) -> GenerateResponse {
    match result {
        Ok(body) => GenerateResponse {
            status: format!("Generated successfully for voice: {}", voice),
            response: Some(body),
            audio_url: None,
        },
        Err(e) => failure(e),
    }
}

pub fn local(result: Result<LocalGeneration, AppError>) -> GenerateResponse {
    match result {
        Ok(generation) => {
            let audio_url = generation
                .output_file
                .file_name()
                .map(|name| format!("/outputs/{}", name.to_string_lossy()));
            GenerateResponse {
                status: format!(
                    "Generated {} audio segments in {:.2} seconds for voice: {}",
                    generation.segments, generation.duration, generation.voice
                ),
                response: serde_json::to_value(&generation)
                    .map_err(|e| tracing::warn!("Failed to encode generation metadata: {}", e))
                    .ok(),
                audio_url,
            }
        }
        Err(e) => failure(e),
    }
}

pub fn failure(err: AppError) -> GenerateResponse {
    let status = match &err {
        AppError::EmptyInput => err.to_string(),
        _ => format!("Error: {}", err),
    };
    GenerateResponse::status_only(status)
}
