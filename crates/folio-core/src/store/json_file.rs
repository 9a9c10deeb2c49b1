//! JSON export file as a document store
//!
//! Accepted layouts:
//!
//! ```text
//! [ { "id": "p1", "title": ... }, ... ]                  # documents of one collection
//! { "projects": [ { "id": "p1", ... } ] }                # collections by name
//! { "projects": { "p1": { "title": ... }, ... } }        # documents keyed by id
//! ```
//!
//! Subscriptions watch the export's directory with `notify` and re-deliver
//! the full collection whenever the file's contents change. The directory is
//! watched rather than the file so that exports replaced by rename are seen.
//! When no watcher can be set up the file is polled instead. Failures are
//! delivered once per transition, not on every change event.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{CollectionQuery, DocumentSnapshot, DocumentStore, SnapshotSink, Subscription};
use crate::error::{FolioError, FolioResult};
use crate::types::RawDocument;

/// Default interval between reads when the file system can't be watched
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// [`DocumentStore`] backed by a JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    poll_interval: Duration,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_text(path: &Path) -> FolioResult<String> {
        tokio::fs::read_to_string(path).await.map_err(|e| {
            FolioError::Connection(format!("cannot read {}: {}", path.display(), e))
        })
    }
}

/// What wakes a file subscription up to re-read the export
enum ChangeSource {
    Events {
        rx: mpsc::UnboundedReceiver<()>,
    },
    Poll {
        ticker: tokio::time::Interval,
    },
}

impl ChangeSource {
    fn poll(interval: Duration) -> Self {
        let start = tokio::time::Instant::now() + interval;
        let mut ticker = tokio::time::interval_at(start, interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ChangeSource::Poll { ticker }
    }

    /// Wait for the next change; `false` once the watcher is gone
    async fn changed(&mut self) -> bool {
        match self {
            ChangeSource::Events { rx } => {
                let woke = rx.recv().await.is_some();
                // One re-read covers a burst of events.
                while rx.try_recv().is_ok() {}
                woke
            }
            ChangeSource::Poll { ticker } => {
                ticker.tick().await;
                true
            }
        }
    }
}

/// Watch the directory holding `path`, signalling on events that touch it
fn watch_export(path: &Path) -> FolioResult<(RecommendedWatcher, mpsc::UnboundedReceiver<()>)> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let file_name = path.file_name().map(OsStr::to_os_string);
    let (tx, rx) = mpsc::unbounded_channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) if touches_export(&event, file_name.as_deref()) => {
                let _ = tx.send(());
            }
            Ok(_) => {}
            Err(e) => debug!(error = %e, "File watcher error"),
        },
        notify::Config::default(),
    )
    .map_err(|e| FolioError::Connection(format!("cannot create file watcher: {}", e)))?;

    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .map_err(|e| FolioError::Connection(format!("cannot watch {}: {}", dir.display(), e)))?;
    Ok((watcher, rx))
}

/// Whether `event` creates, modifies or removes the export file
fn touches_export(event: &Event, file_name: Option<&OsStr>) -> bool {
    let relevant = matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    );
    relevant && event.paths.iter().any(|p| p.file_name() == file_name)
}

/// Extract a collection's documents from file contents
///
/// Entries without a usable id are skipped with a warning.
pub(crate) fn parse_collection(text: &str, collection: &str) -> FolioResult<Vec<RawDocument>> {
    let root: Value = serde_json::from_str(text)?;
    let section = match root {
        Value::Array(items) => Value::Array(items),
        Value::Object(mut map) => match map.remove(collection) {
            Some(section) => section,
            None => {
                return Err(FolioError::Connection(format!(
                    "collection '{}' not present in export",
                    collection
                )))
            }
        },
        _ => {
            return Err(FolioError::Serialization(
                "export must be a JSON array or object".to_string(),
            ))
        }
    };

    let mut skipped = 0usize;
    let docs: Vec<RawDocument> = match section {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| {
                let doc = RawDocument::from_value(item);
                if doc.is_none() {
                    skipped += 1;
                }
                doc
            })
            .collect(),
        Value::Object(keyed) => keyed
            .into_iter()
            .filter_map(|(id, item)| {
                let doc = RawDocument::from_keyed(&id, item);
                if doc.is_none() {
                    skipped += 1;
                }
                doc
            })
            .collect(),
        _ => {
            return Err(FolioError::Serialization(format!(
                "collection '{}' must be an array or object",
                collection
            )))
        }
    };

    if skipped > 0 {
        warn!(collection, skipped, "Skipped export entries without an id");
    }
    Ok(docs)
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn fetch_all(&self, query: &CollectionQuery) -> FolioResult<Vec<RawDocument>> {
        let text = Self::read_text(&self.path).await?;
        let docs = parse_collection(&text, &query.collection)?;
        debug!(path = %self.path.display(), count = docs.len(), "Read export file");
        Ok(query.apply(docs))
    }

    fn subscribe(&self, query: &CollectionQuery, sink: SnapshotSink) -> FolioResult<Subscription> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            FolioError::InvalidOperation("file subscriptions need a Tokio runtime".to_string())
        })?;

        let (subscription, gate) = Subscription::new();
        let path = self.path.clone();
        let query = query.clone();

        // The watcher is registered before the first read so no change slips between them.
        let (watcher, mut source) = match watch_export(&path) {
            Ok((watcher, rx)) => (Some(watcher), ChangeSource::Events { rx }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, interval = ?self.poll_interval, "Falling back to polling export file");
                (None, ChangeSource::poll(self.poll_interval))
            }
        };

        let task = runtime.spawn(async move {
            info!(path = %path.display(), "Watching export file");
            let mut last: Option<FolioResult<String>> = None;

            loop {
                if !gate.is_active() {
                    break;
                }

                let current = Self::read_text(&path).await;
                if last.as_ref() != Some(&current) {
                    let snapshot: DocumentSnapshot = match &current {
                        Ok(text) => parse_collection(text, &query.collection).map(|d| query.apply(d)),
                        Err(e) => Err(e.clone()),
                    };
                    last = Some(current);

                    if let Err(e) = &snapshot {
                        warn!(path = %path.display(), error = %e, "Export file unavailable");
                    }
                    if !gate.deliver(|| sink(snapshot)) {
                        break;
                    }
                }

                if !source.changed().await {
                    break;
                }
            }
            debug!(path = %path.display(), "Stopped watching export file");
        });

        Ok(subscription.on_cancel(move || {
            drop(watcher);
            task.abort();
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_array_layout() {
        let docs = parse_collection(r#"[{"id":"a","title":"A"},{"title":"no id"}]"#, "projects").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "a");
    }

    #[test]
    fn test_parse_named_collection_layout() {
        let text = r#"{"projects":[{"id":"a"}],"categories":[{"id":"c"}]}"#;
        let docs = parse_collection(text, "projects").unwrap();
        assert_eq!(docs.len(), 1);
        let cats = parse_collection(text, "categories").unwrap();
        assert_eq!(cats[0].id, "c");
    }

    #[test]
    fn test_parse_keyed_layout() {
        let docs = parse_collection(r#"{"projects":{"k1":{"title":"One"},"k2":7}}"#, "projects").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "k1");
    }

    #[test]
    fn test_parse_missing_collection_is_connection_error() {
        let err = parse_collection(r#"{"assets":[]}"#, "projects").unwrap_err();
        assert!(err.is_connection());
    }

    #[test]
    fn test_parse_garbage_is_serialization_error() {
        assert!(matches!(
            parse_collection("not json", "projects"),
            Err(FolioError::Serialization(_))
        ));
        assert!(matches!(
            parse_collection("42", "projects"),
            Err(FolioError::Serialization(_))
        ));
    }

    #[test]
    fn test_only_export_file_events_count() {
        use notify::event::{AccessKind, DataChange, ModifyKind};

        let name = Some(OsStr::new("projects.json"));
        let modify = Event::new(EventKind::Modify(ModifyKind::Data(DataChange::Any)));

        assert!(touches_export(&modify.clone().add_path(PathBuf::from("/data/projects.json")), name));
        assert!(!touches_export(&modify.add_path(PathBuf::from("/data/other.json")), name));
        assert!(!touches_export(
            &Event::new(EventKind::Access(AccessKind::Any)).add_path(PathBuf::from("/data/projects.json")),
            name
        ));
    }

    fn channel_sink() -> (SnapshotSink, mpsc::UnboundedReceiver<DocumentSnapshot>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink: SnapshotSink = std::sync::Arc::new(move |snapshot| {
            let _ = tx.send(snapshot);
        });
        (sink, rx)
    }

    async fn next_snapshot(rx: &mut mpsc::UnboundedReceiver<DocumentSnapshot>) -> DocumentSnapshot {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("snapshot within timeout")
            .expect("subscription still open")
    }

    #[tokio::test]
    async fn test_file_events_drive_redelivery() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("projects.json");
        std::fs::write(&path, r#"[{"id":"a"}]"#).unwrap();

        // Polling alone would not fire within the test's lifetime.
        let store = JsonFileStore::new(&path).with_poll_interval(Duration::from_secs(3600));
        let (sink, mut rx) = channel_sink();
        let subscription = store.subscribe(&CollectionQuery::default(), sink).unwrap();
        assert_eq!(next_snapshot(&mut rx).await.unwrap().len(), 1);

        // Replace by rename, the way exports are usually written.
        let staging = dir.path().join("projects.json.tmp");
        std::fs::write(&staging, r#"[{"id":"a"},{"id":"b"}]"#).unwrap();
        std::fs::rename(&staging, &path).unwrap();
        assert_eq!(next_snapshot(&mut rx).await.unwrap().len(), 2);

        subscription.cancel();
        std::fs::write(&path, "[]").unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unwatchable_directory_falls_back_to_polling() {
        let store = JsonFileStore::new("/definitely/not/here.json").with_poll_interval(Duration::from_millis(10));
        let (sink, mut rx) = channel_sink();
        let subscription = store.subscribe(&CollectionQuery::default(), sink).unwrap();

        assert!(next_snapshot(&mut rx).await.unwrap_err().is_connection());
        // The failure is reported once, not on every poll.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(rx.try_recv().is_err());
        subscription.cancel();
    }

    #[tokio::test]
    async fn test_missing_file_is_connection_error() {
        let store = JsonFileStore::new("/definitely/not/here.json");
        let err = store.fetch_all(&CollectionQuery::default()).await.unwrap_err();
        assert!(err.is_connection());
    }
}
