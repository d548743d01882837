use std::sync::Arc;

use tokio::net::TcpListener;

use orpheus_webui::local::{LocalGenerator, OrpheusBackend};
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
    let backend = OrpheusBackend::new(&config).expect("Failed to build HTTP client");
    let generator =
        LocalGenerator::new(&config, Arc::new(backend)).expect("Failed to build HTTP client");

    tracing::info!("Orpheus TTS local WebUI v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Local model API: {}", config.local_api_url);
    tracing::info!("SNAC decoder: {}", config.snac_model_path.display());
    tracing::info!("Outputs directory: {}", config.outputs_dir.display());

    let status = generator.check().await;
    if status.available {
        tracing::info!("{}", status.message);
    } else {
        tracing::warn!("{}", status.message);
    }

    let state = Arc::new(AppState {
        config,
        generator: Generator::Local(generator),
    });
    let app = create_router(state);

    let listener = match TcpListener::bind(("127.0.0.1", UI_PORT)).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::warn!("Failed to bind 127.0.0.1:{}: {}, retrying on localhost", UI_PORT, e);
            TcpListener::bind(("localhost", UI_PORT))
                .await
                .expect("Failed to bind to address")
        }
    };

    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Starting server on http://{}", addr);
    }

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
