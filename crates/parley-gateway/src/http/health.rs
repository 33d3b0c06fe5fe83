use axum::{extract::State, Json};
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::app::AppState;

/// GET /health: liveness probe, returns relay counters.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let stats = state.relay.stats();
    let uptime = (Utc::now() - state.started_at).num_seconds().max(0);
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "viewers": stats.viewers,
        "messages": stats.messages,
        "total_received": stats.total_received,
        "history_limit": stats.history_limit,
        "started_at": state.started_at.to_rfc3339(),
        "uptime_secs": uptime,
    }))
}
