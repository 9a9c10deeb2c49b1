//! In-process document store
//!
//! Holds collections in memory and pushes the full collection to every live
//! subscriber whenever a collection is mutated. Deliveries run synchronously
//! on the mutating thread, after the store lock has been released.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{
    CollectionQuery, DocumentSnapshot, DocumentStore, SnapshotSink, Subscription,
    SubscriptionGate,
};
use crate::error::{FolioError, FolioResult};
use crate::types::RawDocument;

struct Subscriber {
    id: u64,
    query: CollectionQuery,
    sink: SnapshotSink,
    gate: SubscriptionGate,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<String, Vec<RawDocument>>,
    subscribers: Vec<Subscriber>,
    unavailable: Option<String>,
    next_subscriber: u64,
}

impl Inner {
    fn snapshot(&self, query: &CollectionQuery) -> DocumentSnapshot {
        if let Some(reason) = &self.unavailable {
            return Err(FolioError::Connection(reason.clone()));
        }
        let docs = self
            .collections
            .get(&query.collection)
            .cloned()
            .unwrap_or_default();
        Ok(query.apply(docs))
    }

    /// Pending deliveries for subscribers of `collection` (all when `None`)
    fn deliveries(&self, collection: Option<&str>) -> Vec<(SnapshotSink, SubscriptionGate, DocumentSnapshot)> {
        self.subscribers
            .iter()
            .filter(|s| collection.map_or(true, |c| s.query.collection == c))
            .map(|s| (s.sink.clone(), s.gate.clone(), self.snapshot(&s.query)))
            .collect()
    }
}

/// In-memory [`DocumentStore`]
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store with one pre-populated collection
    pub fn with_collection(collection: &str, docs: Vec<RawDocument>) -> Self {
        let store = Self::new();
        store
            .inner
            .lock()
            .collections
            .insert(collection.to_string(), docs);
        store
    }

    /// Replace a whole collection and notify its subscribers
    pub fn replace_collection(&self, collection: &str, docs: Vec<RawDocument>) {
        let deliveries = {
            let mut inner = self.inner.lock();
            inner.collections.insert(collection.to_string(), docs);
            inner.deliveries(Some(collection))
        };
        Self::dispatch(deliveries);
    }

    /// Insert or replace one document and notify subscribers
    pub fn upsert(&self, collection: &str, doc: RawDocument) {
        let deliveries = {
            let mut inner = self.inner.lock();
            let docs = inner.collections.entry(collection.to_string()).or_default();
            match docs.iter_mut().find(|d| d.id == doc.id) {
                Some(existing) => *existing = doc,
                None => docs.push(doc),
            }
            inner.deliveries(Some(collection))
        };
        Self::dispatch(deliveries);
    }

    /// Remove one document; returns whether it existed
    pub fn remove(&self, collection: &str, id: &str) -> bool {
        let (removed, deliveries) = {
            let mut inner = self.inner.lock();
            let removed = match inner.collections.get_mut(collection) {
                Some(docs) => {
                    let before = docs.len();
                    docs.retain(|d| d.id != id);
                    docs.len() != before
                }
                None => false,
            };
            let deliveries = if removed {
                inner.deliveries(Some(collection))
            } else {
                Vec::new()
            };
            (removed, deliveries)
        };
        Self::dispatch(deliveries);
        removed
    }

    /// Simulate the store becoming unreachable (`Some`) or recovering (`None`)
    ///
    /// Live subscribers receive the resulting error or the recovered data.
    pub fn set_unavailable(&self, reason: Option<&str>) {
        let deliveries = {
            let mut inner = self.inner.lock();
            inner.unavailable = reason.map(str::to_string);
            inner.deliveries(None)
        };
        Self::dispatch(deliveries);
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }

    fn dispatch(deliveries: Vec<(SnapshotSink, SubscriptionGate, DocumentSnapshot)>) {
        for (sink, gate, snapshot) in deliveries {
            gate.deliver(|| sink(snapshot));
        }
    }

    fn unsubscribe(inner: &Weak<Mutex<Inner>>, id: u64) {
        if let Some(inner) = inner.upgrade() {
            // Dropped outside the lock: a sink may own a subscription of its own.
            let removed: Vec<Subscriber> = {
                let mut guard = inner.lock();
                let (keep, removed): (Vec<Subscriber>, Vec<Subscriber>) = std::mem::take(&mut guard.subscribers)
                    .into_iter()
                    .partition(|s| s.id != id);
                guard.subscribers = keep;
                removed
            };
            debug!(subscriber = id, removed = removed.len(), "Memory store subscription removed");
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch_all(&self, query: &CollectionQuery) -> FolioResult<Vec<RawDocument>> {
        self.inner.lock().snapshot(query)
    }

    async fn fetch_one(&self, collection: &str, id: &str) -> FolioResult<Option<RawDocument>> {
        let inner = self.inner.lock();
        if let Some(reason) = &inner.unavailable {
            return Err(FolioError::Connection(reason.clone()));
        }
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id).cloned()))
    }

    fn subscribe(&self, query: &CollectionQuery, sink: SnapshotSink) -> FolioResult<Subscription> {
        let (subscription, gate, initial) = {
            let mut inner = self.inner.lock();
            if let Some(reason) = &inner.unavailable {
                warn!(collection = %query.collection, %reason, "Subscribe refused: store unavailable");
                return Err(FolioError::Connection(reason.clone()));
            }

            let id = inner.next_subscriber;
            inner.next_subscriber += 1;

            let weak = Arc::downgrade(&self.inner);
            let (subscription, gate) = Subscription::new();
            let subscription = subscription.on_cancel(move || Self::unsubscribe(&weak, id));

            inner.subscribers.push(Subscriber {
                id,
                query: query.clone(),
                sink: sink.clone(),
                gate: gate.clone(),
            });
            debug!(subscriber = id, collection = %query.collection, "Memory store subscription added");
            (subscription, gate, inner.snapshot(query))
        };

        gate.deliver(|| sink(initial));
        Ok(subscription)
    }
}
