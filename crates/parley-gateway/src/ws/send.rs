use axum::extract::ws::{Message, WebSocket};
use parley_core::Record;
use parley_relay::TransportError;

/// Serialize a record to JSON and send it as one text frame.
pub async fn json(socket: &mut WebSocket, record: &Record) -> Result<(), TransportError> {
    let json = record
        .to_json()
        .map_err(|e| TransportError::SendFailed(e.to_string()))?;
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|e| TransportError::SendFailed(e.to_string()))
}
