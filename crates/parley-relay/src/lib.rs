pub mod broadcast;
pub mod error;
pub mod log;
pub mod relay;
pub mod transport;

pub use broadcast::Broadcaster;
pub use error::TransportError;
pub use log::MessageLog;
pub use relay::{IngestReceipt, Relay, RelayStats, Subscription, ViewerExit};
pub use transport::{Inbound, ViewerTransport};
