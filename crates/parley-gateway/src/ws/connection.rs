use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{ws::Message, ws::WebSocket, State, WebSocketUpgrade},
    response::IntoResponse,
};
use parley_core::Record;
use parley_relay::{Inbound, TransportError, ViewerTransport};
use std::sync::Arc;
use tracing::debug;

use crate::app::AppState;
use crate::ws::send;

/// Axum handler: upgrades HTTP to WebSocket at GET /ws.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.max_message_size(state.config.gateway.max_payload_bytes)
        .on_upgrade(|socket| run_connection(socket, state))
}

/// Per-connection task: replay, then live fan-out until the socket ends.
async fn run_connection(socket: WebSocket, state: Arc<AppState>) {
    let exit = state.relay.serve_viewer(WsViewer { socket }).await;
    debug!(?exit, "WS connection finished");
}

/// One viewer's WebSocket, as seen by the relay.
pub struct WsViewer {
    socket: WebSocket,
}

#[async_trait]
impl ViewerTransport for WsViewer {
    async fn send(&mut self, record: &Record) -> Result<(), TransportError> {
        send::json(&mut self.socket, record).await
    }

    async fn recv(&mut self) -> Result<Inbound, TransportError> {
        loop {
            match self.socket.recv().await {
                Some(Ok(Message::Text(text))) => return Ok(Inbound::Data { bytes: text.len() }),
                Some(Ok(Message::Binary(data))) => return Ok(Inbound::Data { bytes: data.len() }),
                // pongs to client pings are queued by the socket itself
                Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
                Some(Ok(Message::Close(_))) | None => return Ok(Inbound::Closed),
                Some(Err(e)) => return Err(TransportError::RecvFailed(e.to_string())),
            }
        }
    }

    async fn keepalive(&mut self) -> Result<(), TransportError> {
        self.socket
            .send(Message::Ping(Bytes::new()))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }
}
