//! Snapshot bus
//!
//! ```text
//! execute_command ──commit──▶ publish(StoreSnapshot) ──▶ broadcast::Sender[collection]
//!                                                              │
//!                                     subscribers ◀────────────┘
//! ```
//!
//! One channel per [`Collection`]. Every message is the full collection;
//! a lagging receiver loses intermediate snapshots only.

use std::collections::HashMap;
use std::sync::Arc;

use shared::snapshot::{Collection, StoreSnapshot};
use tokio::sync::broadcast;

/// Per-collection broadcast channels
#[derive(Debug, Clone)]
pub struct SnapshotBus {
    channels: Arc<HashMap<Collection, broadcast::Sender<Arc<StoreSnapshot>>>>,
}

impl SnapshotBus {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let channels = Collection::ALL
            .iter()
            .map(|c| (*c, broadcast::channel(capacity).0))
            .collect();
        Self {
            channels: Arc::new(channels),
        }
    }

    fn sender(&self, collection: Collection) -> Option<&broadcast::Sender<Arc<StoreSnapshot>>> {
        self.channels.get(&collection)
    }

    pub fn subscribe(&self, collection: Collection) -> Option<broadcast::Receiver<Arc<StoreSnapshot>>> {
        self.sender(collection).map(|tx| tx.subscribe())
    }

    /// Publish a snapshot to its collection's subscribers
    ///
    /// Returns the number of receivers reached.
    pub fn publish(&self, snapshot: StoreSnapshot) -> usize {
        let collection = snapshot.collection();
        let Some(tx) = self.sender(collection) else {
            return 0;
        };
        let len = snapshot.len();
        match tx.send(Arc::new(snapshot)) {
            Ok(receivers) => {
                tracing::debug!(%collection, documents = len, receivers, "Snapshot published");
                receivers
            }
            Err(_) => {
                tracing::debug!(%collection, "Snapshot dropped: no active receivers");
                0
            }
        }
    }

    pub fn receiver_count(&self, collection: Collection) -> usize {
        self.sender(collection).map(|tx| tx.receiver_count()).unwrap_or(0)
    }
}

impl Default for SnapshotBus {
    fn default() -> Self {
        Self::new(256)
    }
}
