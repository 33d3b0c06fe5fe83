//! Webhook ingress endpoint: POST /webhook.
//!
//! The body is one chat record: any JSON object. It is appended to the relay
//! log and fanned out to connected viewers before the acknowledgment returns.
//! Whether a viewer actually received it does not affect the response.

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use parley_core::{ParleyError, Record};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::AppState;

/// POST /webhook
///
/// Returns 200 `{"status":"received"}` once the record is in the log,
/// 400 if the body is not a JSON object, 413 past the configured size cap.
pub async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    info!(bytes = body.len(), "webhook arrived");

    let record = Record::from_slice(&body).map_err(|e| {
        warn!(error = %e, "rejected webhook body");
        bad_request(&e)
    })?;

    let receipt = state.relay.ingest(record);

    info!(
        sequence = receipt.sequence,
        delivered = receipt.delivered,
        "webhook accepted"
    );
    Ok(Json(json!({"status": "received"})))
}

fn bad_request(err: &ParleyError) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": err.to_string(), "code": err.code()})),
    )
}
