//! Remote collection fetcher
//!
//! Reads project documents from a [`DocumentStore`], normalizes each one into
//! a [`ProjectRecord`] and enforces id uniqueness within a snapshot. Every
//! delivery is a complete list; consumers replace their raw list wholesale.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{FolioError, FolioResult};
use crate::store::{CollectionQuery, DocumentStore, SnapshotSink, Subscription};
use crate::types::{ProjectId, ProjectRecord, RawDocument};

/// A full, normalized project list or the error that prevented it
pub type Snapshot = FolioResult<Vec<ProjectRecord>>;

/// Fetches and normalizes projects for one fixed collection query
#[derive(Clone)]
pub struct ProjectFetcher {
    store: Arc<dyn DocumentStore>,
    query: CollectionQuery,
}

impl ProjectFetcher {
    pub fn new(store: Arc<dyn DocumentStore>, query: CollectionQuery) -> Self {
        Self { store, query }
    }

    pub fn query(&self) -> &CollectionQuery {
        &self.query
    }

    /// One-shot read of the whole collection
    ///
    /// # Errors
    ///
    /// Returns `FolioError::Connection` if the store is unreachable or
    /// misconfigured; other store errors are passed through.
    pub async fn fetch_all(&self) -> FolioResult<Vec<ProjectRecord>> {
        match self.store.fetch_all(&self.query).await {
            Ok(docs) => {
                let records = normalize_snapshot(&docs);
                info!(collection = %self.query.collection, count = records.len(), "Fetched projects");
                Ok(records)
            }
            Err(e) => {
                warn!(collection = %self.query.collection, error = %e, "Could not load projects");
                Err(e)
            }
        }
    }

    /// One-shot read of a single project for the detail view
    pub async fn fetch_project(&self, id: &ProjectId) -> FolioResult<Option<ProjectRecord>> {
        let doc = self
            .store
            .fetch_one(&self.query.collection, id.as_str())
            .await?;
        debug!(%id, found = doc.is_some(), "Fetched project");
        Ok(doc.as_ref().map(ProjectRecord::from_document))
    }

    /// Fetch a project, treating a missing id as an error
    pub async fn require_project(&self, id: &ProjectId) -> FolioResult<ProjectRecord> {
        self.fetch_project(id)
            .await?
            .ok_or_else(|| FolioError::NotFound(id.to_string()))
    }

    /// Live subscription; `on_update` receives every normalized snapshot
    ///
    /// The returned [`Subscription`] must be kept alive for updates to
    /// continue; cancelling (or dropping) it stops delivery.
    pub fn subscribe<F>(&self, on_update: F) -> FolioResult<Subscription>
    where
        F: Fn(Snapshot) + Send + Sync + 'static,
    {
        let collection = self.query.collection.clone();
        let sink: SnapshotSink = Arc::new(move |delivery| {
            let snapshot = delivery.map(|docs| normalize_snapshot(&docs));
            match &snapshot {
                Ok(records) => debug!(%collection, count = records.len(), "Snapshot delivered"),
                Err(e) => warn!(%collection, error = %e, "Snapshot failed"),
            }
            on_update(snapshot);
        });

        let subscription = self.store.subscribe(&self.query, sink)?;
        info!(collection = %self.query.collection, "Subscribed to projects");
        Ok(subscription)
    }
}

/// Normalize a delivered collection
///
/// Duplicate ids keep their first occurrence.
pub fn normalize_snapshot(docs: &[RawDocument]) -> Vec<ProjectRecord> {
    let mut seen = HashSet::with_capacity(docs.len());
    docs.iter()
        .filter(|doc| {
            let fresh = seen.insert(doc.id.as_str());
            if !fresh {
                warn!(id = %doc.id, "Dropping duplicate project id in snapshot");
            }
            fresh
        })
        .map(ProjectRecord::from_document)
        .collect()
}
