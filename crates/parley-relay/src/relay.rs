//! The relay: message log + broadcaster behind one lock.
//!
//! `ingest` (append, then publish) and `join` (snapshot, then register) both
//! run under the same mutex, so a record published while a viewer is joining
//! lands either in that viewer's backlog or in its mailbox, never both and
//! never neither. The lock is never held across an await; socket writes happen
//! in each viewer's own task via [`Relay::serve`].

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use parley_core::config::RelayConfig;
use parley_core::{Record, ViewerId};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::broadcast::Broadcaster;
use crate::error::TransportError;
use crate::log::MessageLog;
use crate::transport::{Inbound, ViewerTransport};

struct RelayState {
    log: MessageLog,
    broadcaster: Broadcaster,
}

/// Shared relay state. Build once at startup and hand out as `Arc<Relay>`.
pub struct Relay {
    state: Mutex<RelayState>,
    queue_capacity: usize,
    send_timeout: Duration,
    heartbeat: Duration,
}

/// Acknowledgment for an ingested record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestReceipt {
    /// Zero-based append position of the record.
    pub sequence: u64,
    /// Viewers the record was queued for at publish time.
    pub delivered: usize,
}

/// A freshly registered viewer: what to replay, and where live records arrive.
#[derive(Debug)]
pub struct Subscription {
    pub id: ViewerId,
    pub backlog: Vec<Arc<Record>>,
    pub mailbox: mpsc::Receiver<Arc<Record>>,
}

/// Why a viewer's session ended.
#[derive(Debug)]
pub enum ViewerExit {
    /// Peer closed the connection.
    Closed,
    /// Send, receive or keepalive failed.
    Transport(TransportError),
    /// The broadcaster dropped the viewer (queue overflow or external deregister).
    Dropped,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelayStats {
    pub viewers: usize,
    pub messages: usize,
    pub total_received: u64,
    pub history_limit: Option<usize>,
}

impl Relay {
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            state: Mutex::new(RelayState {
                log: MessageLog::with_limit(config.history_limit),
                broadcaster: Broadcaster::new(),
            }),
            queue_capacity: config.viewer_queue_capacity.max(1),
            send_timeout: Duration::from_millis(config.send_timeout_ms),
            heartbeat: Duration::from_secs(config.heartbeat_interval_secs.max(1)),
        }
    }

    fn state(&self) -> MutexGuard<'_, RelayState> {
        // Nothing under the lock can leave the log or registry half-updated.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Ingress entry point: append to the log, then fan out to live viewers.
    ///
    /// Never fails; a viewer that cannot take the record is dropped instead.
    pub fn ingest(&self, record: Record) -> IngestReceipt {
        let record = Arc::new(record);
        let receipt = {
            let mut state = self.state();
            let sequence = state.log.append(Arc::clone(&record));
            let delivered = state.broadcaster.publish(&record);
            IngestReceipt {
                sequence,
                delivered,
            }
        };
        debug!(
            sequence = receipt.sequence,
            delivered = receipt.delivered,
            platform = record.platform().unwrap_or("-"),
            "record ingested"
        );
        receipt
    }

    /// Snapshot the log and register a new viewer in one step.
    pub fn join(&self) -> Subscription {
        let id = ViewerId::new();
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        let backlog = {
            let mut state = self.state();
            let backlog = state.log.snapshot();
            state.broadcaster.register(id.clone(), tx);
            backlog
        };
        Subscription {
            id,
            backlog,
            mailbox: rx,
        }
    }

    /// Remove a viewer from live delivery. Returns `false` if it was already gone.
    pub fn deregister(&self, id: &ViewerId) -> bool {
        self.state().broadcaster.deregister(id)
    }

    /// Join and drive one viewer until it goes away.
    pub async fn serve_viewer<T: ViewerTransport>(&self, transport: T) -> ViewerExit {
        let sub = self.join();
        self.serve(sub, transport).await
    }

    /// Replay the backlog, then forward live records until the viewer ends.
    /// The viewer is always deregistered on return.
    pub async fn serve<T: ViewerTransport>(&self, sub: Subscription, mut transport: T) -> ViewerExit {
        let id = sub.id.clone();
        info!(conn_id = %id, backlog = sub.backlog.len(), "viewer joined");

        let exit = self.pump(sub, &mut transport).await;
        self.deregister(&id);

        match &exit {
            ViewerExit::Closed => info!(conn_id = %id, "viewer closed"),
            ViewerExit::Dropped => warn!(conn_id = %id, "viewer dropped by broadcaster"),
            ViewerExit::Transport(e) => warn!(conn_id = %id, error = %e, "viewer transport failed"),
        }
        exit
    }

    async fn pump<T: ViewerTransport>(&self, sub: Subscription, transport: &mut T) -> ViewerExit {
        let Subscription {
            id,
            backlog,
            mut mailbox,
        } = sub;

        for record in backlog {
            if let Err(e) = self.deliver(transport, &record).await {
                return ViewerExit::Transport(e);
            }
        }

        let mut tick = interval_at(Instant::now() + self.heartbeat, self.heartbeat);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                next = mailbox.recv() => {
                    let Some(record) = next else {
                        return ViewerExit::Dropped;
                    };
                    if let Err(e) = self.deliver(transport, &record).await {
                        return ViewerExit::Transport(e);
                    }
                }

                inbound = transport.recv() => {
                    match inbound {
                        Ok(Inbound::Data { bytes }) => {
                            debug!(conn_id = %id, bytes, "ignoring inbound viewer frame");
                        }
                        Ok(Inbound::Closed) => return ViewerExit::Closed,
                        Err(e) => return ViewerExit::Transport(e),
                    }
                }

                _ = tick.tick() => {
                    if let Err(e) = transport.keepalive().await {
                        return ViewerExit::Transport(e);
                    }
                }
            }
        }
    }

    async fn deliver<T: ViewerTransport>(
        &self,
        transport: &mut T,
        record: &Record,
    ) -> Result<(), TransportError> {
        match tokio::time::timeout(self.send_timeout, transport.send(record)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                ms: self.send_timeout.as_millis() as u64,
            }),
        }
    }

    /// Retained records, oldest first.
    pub fn history(&self) -> Vec<Arc<Record>> {
        self.state().log.snapshot()
    }

    pub fn viewer_count(&self) -> usize {
        self.state().broadcaster.len()
    }

    pub fn stats(&self) -> RelayStats {
        let state = self.state();
        RelayStats {
            viewers: state.broadcaster.len(),
            messages: state.log.len(),
            total_received: state.log.total_appended(),
            history_limit: state.log.limit(),
        }
    }
}

impl Default for Relay {
    fn default() -> Self {
        Self::new(&RelayConfig::default())
    }
}
