use async_trait::async_trait;
use parley_core::Record;

use crate::error::TransportError;

/// What a viewer sent us. The relay reads it only to notice closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// A frame arrived; its contents are not interpreted.
    Data { bytes: usize },
    /// The peer closed the connection cleanly.
    Closed,
}

/// Interface a connection adapter (WebSocket, test double, …) implements so the
/// relay can drive one viewer.
///
/// The relay owns the adapter for the lifetime of the viewer and never calls
/// two methods concurrently, hence `&mut self` throughout.
#[async_trait]
pub trait ViewerTransport: Send {
    /// Push one record to the viewer.
    async fn send(&mut self, record: &Record) -> Result<(), TransportError>;

    /// Wait for the next inbound frame or for closure.
    ///
    /// Must be cancel-safe: the relay polls it inside `tokio::select!` and
    /// drops the future whenever a live record is ready first.
    async fn recv(&mut self) -> Result<Inbound, TransportError>;

    /// Probe the peer on the heartbeat interval. An error ends the viewer.
    async fn keepalive(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}
