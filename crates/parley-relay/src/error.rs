use thiserror::Error;

/// Failures reported by a viewer transport. Each one ends that viewer only.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The peer went away or the socket is already shut.
    #[error("Connection closed")]
    Closed,

    /// A record could not be written to the peer.
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// Reading from the peer failed.
    #[error("Receive failed: {0}")]
    RecvFailed(String),

    /// A send did not complete within its time budget.
    #[error("Send timed out after {ms}ms")]
    Timeout { ms: u64 },
}
