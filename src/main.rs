use std::net::SocketAddr;
use std::sync::Arc;

use orpheus_webui::bastion::BastionClient;
use orpheus_webui::{create_router, init_logging, AppState, Config, Generator, UI_PORT};

#[tokio::main]
async fn main() {
    // Values already in the environment win over .env entries.
    let dotenv_path = dotenvy::dotenv().ok();
    init_logging();
    if let Some(path) = &dotenv_path {
        tracing::info!("Loaded environment from {}", path.display());
    }

    let config = Arc::new(Config::from_env());
    let client = BastionClient::new(&config).expect("Failed to build HTTP client");

    let addr = SocketAddr::from(([0, 0, 0, 0], UI_PORT));

    tracing::info!("Orpheus TTS WebUI v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Starting server on http://{}", addr);
    tracing::info!("Bastion URL: {}", client.base_url());
    tracing::info!(
        "API key: {}",
        if config.api_key_configured() { "configured" } else { "not set" }
    );

    let state = Arc::new(AppState {
        config,
        generator: Generator::Remote(client),
    });
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
