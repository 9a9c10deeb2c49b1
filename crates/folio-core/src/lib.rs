//! Folio Core Library
//!
//! Project gallery pipeline for a portfolio site.
//!
//! ## Overview
//!
//! Projects live in an external document store. Folio fetches them (once or
//! through a live subscription), normalizes each document into a
//! [`ProjectRecord`], and derives the list a gallery renders from the user's
//! query controls: debounced search text, category, and sort order. Rendered
//! items get a one-time reveal flag the first time they scroll into view.
//!
//! ## Pipeline
//!
//! ```text
//!   DocumentStore ──► ProjectFetcher ──► raw list ─┐
//!                                                  ├─► pipeline::apply ──► visible
//!   keystrokes ──► Debouncer ──► QueryState ───────┘          │
//!                                                             ▼
//!                                                   RevealTracker::bind
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use folio_core::{FolioConfig, Gallery, JsonFileStore, ProjectFetcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FolioConfig::default();
//!     let store = Arc::new(JsonFileStore::new("projects.json"));
//!     let gallery = Gallery::new(ProjectFetcher::new(store, config.collection_query()), &config, None);
//!
//!     gallery.load().await?;
//!     for project in gallery.visible() {
//!         println!("{}", project.display_title());
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod debounce;
pub mod error;
pub mod fetch;
pub mod gallery;
pub mod pipeline;
pub mod query;
pub mod reveal;
pub mod store;
pub mod types;

// Re-exports
pub use config::FolioConfig;
pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use error::{FolioError, FolioResult};
pub use fetch::{normalize_snapshot, ProjectFetcher, Snapshot};
pub use gallery::{FetchStatus, Gallery, GalleryEvent, GalleryState};
pub use pipeline::PipelineQuery;
pub use query::{CategorySet, QueryState};
pub use reveal::{
    intersection_ratio, reveal_delay, GeometryObserver, Rect, RevealOptions, RevealTracker,
    VisibilityEntry, VisibilityObserver,
};
pub use store::{
    CollectionQuery, DocumentStore, JsonFileStore, MemoryStore, Subscription, DEFAULT_COLLECTION,
};
pub use types::*;
