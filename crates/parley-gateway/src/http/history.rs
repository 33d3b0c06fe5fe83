use axum::{extract::State, Json};
use parley_core::Record;
use std::sync::Arc;

use crate::app::AppState;

/// GET /history: every retained record, oldest first. Same order a new viewer replays.
pub async fn history_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Arc<Record>>> {
    Json(state.relay.history())
}
