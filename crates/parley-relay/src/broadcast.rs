use std::collections::HashMap;
use std::sync::Arc;

use parley_core::{Record, ViewerId};
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, warn};

/// Sending half of a viewer's mailbox. The viewer task drains the other end.
pub type Mailbox = mpsc::Sender<Arc<Record>>;

/// Registry of live viewers and fan-out of published records.
///
/// `publish` never awaits: it offers each record to every mailbox with
/// `try_send`. A closed mailbox (viewer task gone) or a full one (viewer not
/// keeping up) drops that viewer from the set without touching the others.
#[derive(Debug, Default)]
pub struct Broadcaster {
    viewers: HashMap<ViewerId, Mailbox>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a viewer to the active set. An existing entry with the same id is replaced.
    pub fn register(&mut self, id: ViewerId, mailbox: Mailbox) {
        debug!(conn_id = %id, "viewer registered");
        self.viewers.insert(id, mailbox);
    }

    /// Remove a viewer. Returns `false` if it was not registered.
    pub fn deregister(&mut self, id: &ViewerId) -> bool {
        let removed = self.viewers.remove(id).is_some();
        if removed {
            debug!(conn_id = %id, "viewer deregistered");
        }
        removed
    }

    /// Queue `record` for every registered viewer.
    /// Returns how many viewers accepted it.
    pub fn publish(&mut self, record: &Arc<Record>) -> usize {
        let mut delivered = 0;
        self.viewers.retain(|id, mailbox| match mailbox.try_send(Arc::clone(record)) {
            Ok(()) => {
                delivered += 1;
                true
            }
            Err(TrySendError::Full(_)) => {
                warn!(conn_id = %id, "viewer queue full, dropping slow viewer");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(conn_id = %id, "viewer mailbox closed, removing");
                false
            }
        });
        delivered
    }

    pub fn contains(&self, id: &ViewerId) -> bool {
        self.viewers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.viewers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.viewers.is_empty()
    }
}
