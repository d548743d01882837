pub mod api;
pub mod bastion;
pub mod config;
pub mod error;
pub mod generation;
pub mod local;
pub mod prompt;

use tracing_subscriber::EnvFilter;

pub use api::routes::{create_router, AppState, Generator};
pub use config::Config;
pub use error::AppError;
pub use generation::GenerationRequest;

/// UI port shared by both front-ends.
pub const UI_PORT: u16 = 7860;

pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
