//! KitchenHub: live order fan-out to kitchen displays
//!
//! Subscribers are grouped strictly by partition. Each subscriber owns a
//! bounded queue; `publish` never waits on one, so a slow or broken display
//! cannot stall the rest of its channel.
//!
//! ```text
//! OrderPipeline ── publish(partition, event)
//!       │
//!       ▼
//! KitchenHub
//!   └── channels: partition → (connection id → queue sender)
//!         │ try_send (full / closed → subscriber removed)
//!         ▼
//!   Kitchen WS session (Subscription → socket)
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use shared::kitchen::KitchenEvent;
use tokio::sync::mpsc;

use crate::tenant::Partition;

/// Per-subscriber queue depth before it counts as too slow
const SUBSCRIBER_CAPACITY: usize = 256;

pub type ConnectionId = u64;

/// Outcome of one publish
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub dropped: usize,
}

#[derive(Default)]
struct HubInner {
    channels: DashMap<Partition, DashMap<ConnectionId, mpsc::Sender<Arc<KitchenEvent>>>>,
    next_id: AtomicU64,
}

/// Per-partition multicast registry
#[derive(Clone, Default)]
pub struct KitchenHub {
    inner: Arc<HubInner>,
}

impl KitchenHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live connection under `partition`
    pub fn subscribe(&self, partition: &Partition) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CAPACITY);
        self.inner
            .channels
            .entry(partition.clone())
            .or_default()
            .insert(id, tx);
        tracing::debug!(partition = %partition, connection = id, "Kitchen subscriber added");
        Subscription {
            hub: self.clone(),
            partition: partition.clone(),
            id,
            rx,
        }
    }

    /// Remove a connection; no-op when already gone
    pub fn unsubscribe(&self, partition: &Partition, id: ConnectionId) {
        let now_empty = match self.inner.channels.get(partition) {
            Some(subs) => {
                subs.remove(&id);
                subs.is_empty()
            }
            None => return,
        };
        if now_empty {
            self.inner
                .channels
                .remove_if(partition, |_, subs| subs.is_empty());
        }
    }

    /// Deliver `event` to every current subscriber of `partition`
    pub fn publish(&self, partition: &Partition, event: KitchenEvent) -> PublishReport {
        let mut report = PublishReport::default();
        let Some(subs) = self.inner.channels.get(partition) else {
            return report;
        };

        let event = Arc::new(event);
        let mut failed = Vec::new();
        for entry in subs.iter() {
            match entry.value().try_send(event.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    let reason = match e {
                        mpsc::error::TrySendError::Full(_) => "queue full",
                        mpsc::error::TrySendError::Closed(_) => "disconnected",
                    };
                    tracing::warn!(
                        partition = %partition,
                        connection = *entry.key(),
                        event = event.name(),
                        reason,
                        "Dropping kitchen subscriber"
                    );
                    failed.push(*entry.key());
                }
            }
        }
        drop(subs);

        report.dropped = failed.len();
        for id in failed {
            self.unsubscribe(partition, id);
        }
        report
    }

    pub fn subscriber_count(&self, partition: &Partition) -> usize {
        self.inner
            .channels
            .get(partition)
            .map(|subs| subs.len())
            .unwrap_or(0)
    }

    pub fn is_subscribed(&self, partition: &Partition, id: ConnectionId) -> bool {
        self.inner
            .channels
            .get(partition)
            .is_some_and(|subs| subs.contains_key(&id))
    }
}

/// Live registration; unsubscribes when dropped
pub struct Subscription {
    hub: KitchenHub,
    partition: Partition,
    id: ConnectionId,
    rx: mpsc::Receiver<Arc<KitchenEvent>>,
}

impl Subscription {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Next event; `None` once the hub dropped this subscriber
    pub async fn recv(&mut self) -> Option<Arc<KitchenEvent>> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.hub.unsubscribe(&self.partition, self.id);
        tracing::debug!(partition = %self.partition, connection = self.id, "Kitchen subscriber removed");
    }
}
