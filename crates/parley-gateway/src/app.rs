use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use parley_core::config::ParleyConfig;
use parley_relay::Relay;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Central shared state: passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: ParleyConfig,
    pub relay: Relay,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: ParleyConfig) -> Self {
        let relay = Relay::new(&config.relay);
        Self {
            config,
            relay,
            started_at: Utc::now(),
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.gateway.max_payload_bytes;
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/history", get(crate::http::history::history_handler))
        .route("/webhook", post(crate::http::webhooks::webhook_handler))
        .route("/ws", get(crate::ws::connection::ws_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
