use axum::{
    http::{header, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use super::handlers;
use crate::bastion::BastionClient;
use crate::config::Config;
use crate::local::LocalGenerator;

pub enum Generator {
    Remote(BastionClient),
    Local(LocalGenerator),
}

pub struct AppState {
    pub config: Arc<Config>,
    pub generator: Generator,
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let mut api_routes = Router::new()
        .route("/generate", post(handlers::generate))
        .route("/generate/raw", post(handlers::generate_raw))
        .route("/options", get(handlers::options))
        .route("/config", get(handlers::config))
        .route("/health", get(handlers::health));

    let mut router = Router::new().route("/", get(handlers::index));

    if let Generator::Local(generator) = &state.generator {
        api_routes = api_routes.route("/status", get(handlers::status));
        router = router.nest_service("/outputs", ServeDir::new(generator.outputs_dir()));
    }

    router
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
