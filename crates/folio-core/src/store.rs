//! Document store port and adapters.
//!
//! The gallery reads projects from an external document store. This module
//! defines the narrow contract it depends on:
//!
//! - [`DocumentStore::fetch_all`]: one-shot read of a collection
//! - [`DocumentStore::fetch_one`]: one-shot read of a single document
//! - [`DocumentStore::subscribe`]: live subscription that re-delivers the
//!   full collection on every change, returning a cancellable
//!   [`Subscription`]
//!
//! Two adapters ship with the crate:
//!
//! - [`MemoryStore`]: in-process, push-driven; deliveries happen
//!   synchronously on the thread that mutates the store
//! - [`JsonFileStore`]: reads a JSON export from disk; subscriptions poll
//!   the file and re-deliver when its contents change

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FolioResult;
use crate::types::RawDocument;

mod json_file;
mod memory;
mod subscription;

pub use json_file::{JsonFileStore, DEFAULT_POLL_INTERVAL};
pub use memory::MemoryStore;
pub use subscription::{Subscription, SubscriptionGate};

/// Collection the gallery reads by default
pub const DEFAULT_COLLECTION: &str = "projects";

/// A full collection delivery, or the error that prevented it
pub type DocumentSnapshot = FolioResult<Vec<RawDocument>>;

/// Callback receiving every delivery of a subscription
pub type SnapshotSink = Arc<dyn Fn(DocumentSnapshot) + Send + Sync>;

/// Fixed query constraints for a collection read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionQuery {
    /// Collection name
    pub collection: String,
    /// Maximum number of documents to return
    pub limit: Option<usize>,
    /// Field to order by, descending
    pub order_by: Option<String>,
}

impl CollectionQuery {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            limit: None,
            order_by: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn order_by_desc(mut self, field: impl Into<String>) -> Self {
        self.order_by = Some(field.into());
        self
    }

    /// Apply ordering and limit to an unordered collection
    ///
    /// Ordering is stable; documents missing the field go last.
    pub fn apply(&self, mut docs: Vec<RawDocument>) -> Vec<RawDocument> {
        if let Some(field) = &self.order_by {
            docs.sort_by(|a, b| compare_field_desc(a.fields.get(field), b.fields.get(field)));
        }
        if let Some(limit) = self.limit {
            docs.truncate(limit);
        }
        docs
    }
}

impl Default for CollectionQuery {
    fn default() -> Self {
        Self::new(DEFAULT_COLLECTION)
    }
}

/// Port to an external document store
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the whole (query-constrained) collection once
    async fn fetch_all(&self, query: &CollectionQuery) -> FolioResult<Vec<RawDocument>>;

    /// Read one document by id; `Ok(None)` when it does not exist
    async fn fetch_one(&self, collection: &str, id: &str) -> FolioResult<Option<RawDocument>> {
        let query = CollectionQuery::new(collection);
        Ok(self
            .fetch_all(&query)
            .await?
            .into_iter()
            .find(|doc| doc.id == id))
    }

    /// Subscribe to the collection
    ///
    /// `sink` receives the full collection on every change. Misconfiguration
    /// detected up front is returned as an error; later failures are
    /// delivered through `sink`.
    fn subscribe(&self, query: &CollectionQuery, sink: SnapshotSink) -> FolioResult<Subscription>;
}

fn compare_field_desc(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (sortable(a), sortable(b)) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(PartialEq, PartialOrd)]
enum SortValue<'a> {
    Number(f64),
    Text(&'a str),
}

fn sortable(value: Option<&Value>) -> Option<SortValue<'_>> {
    match value? {
        Value::Number(n) => n.as_f64().map(SortValue::Number),
        Value::String(s) => Some(SortValue::Text(s)),
        Value::Object(obj) => obj
            .get("seconds")
            .or_else(|| obj.get("_seconds"))
            .and_then(Value::as_f64)
            .map(SortValue::Number),
        _ => None,
    }
}
