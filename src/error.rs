use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

pub const EMPTY_INPUT_MESSAGE: &str = "Please enter some text";

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{}", EMPTY_INPUT_MESSAGE)]
    EmptyInput,

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Backend(String),

    #[error("SNAC decoder error: {0}")]
    Decoder(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::EmptyInput => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE"),
            AppError::Http(_) => (StatusCode::BAD_GATEWAY, "HTTP_ERROR"),
            AppError::Backend(_) => (StatusCode::BAD_GATEWAY, "BACKEND_ERROR"),
            AppError::Decoder(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DECODER_ERROR"),
            AppError::IoError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        };
        let message = self.to_string();

        tracing::error!("Request failed: {} - {}", code, message);

        (
            status,
            Json(ErrorResponse {
                error: message,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}
