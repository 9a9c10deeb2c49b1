//! Gallery controller
//!
//! Wires the fetcher, query state, search debouncer, pipeline and reveal
//! tracker together. [`GalleryState`] is the synchronous core; [`Gallery`]
//! owns the live resources around it (store subscription, debounce timer and
//! event channel) and releases them on [`Gallery::shutdown`] or drop.
//!
//! # Example
//!
//! ```ignore
//! let gallery = Gallery::new(fetcher, &FolioConfig::default(), None);
//! let mut events = gallery.subscribe_events();
//! gallery.watch()?;
//! gallery.set_search_text("bet");
//! while let Ok(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! ```

mod events;
mod state;

pub use events::GalleryEvent;
pub use state::{FetchStatus, GalleryState};

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::config::FolioConfig;
use crate::debounce::Debouncer;
use crate::error::FolioResult;
use crate::fetch::{ProjectFetcher, Snapshot};
use crate::query::CategorySet;
use crate::reveal::{RevealTracker, VisibilityObserver};
use crate::store::Subscription;
use crate::types::{CategoryFilter, ProjectId, ProjectRecord, SortOrder, ViewMode};

/// Default capacity for the gallery event channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

type SharedState = Arc<Mutex<GalleryState>>;

pub struct Gallery {
    state: SharedState,
    fetcher: ProjectFetcher,
    debouncer: Debouncer<String>,
    /// Live store subscription while watching
    subscription: Mutex<Option<Subscription>>,
    event_tx: broadcast::Sender<GalleryEvent>,
}

impl Gallery {
    pub fn new(
        fetcher: ProjectFetcher,
        config: &FolioConfig,
        observer: Option<Box<dyn VisibilityObserver>>,
    ) -> Self {
        let state: SharedState = Arc::new(Mutex::new(GalleryState::new(RevealTracker::new(
            config.reveal_options(),
            observer,
        ))));
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let debounce_state = state.clone();
        let debounce_tx = event_tx.clone();
        let debouncer = Debouncer::new(config.debounce(), move |query: String| {
            let (changed, visible) = {
                let mut state = debounce_state.lock();
                let changed = state.apply_debounced_search(query.clone());
                (changed, state.visible().len())
            };
            debug!(%query, changed, "Search settled");
            let _ = debounce_tx.send(GalleryEvent::SearchSettled { query });
            if changed {
                let _ = debounce_tx.send(GalleryEvent::ResultsChanged { visible });
            }
        });

        Self {
            state,
            fetcher,
            debouncer,
            subscription: Mutex::new(None),
            event_tx,
        }
    }

    /// One-shot load of the whole collection
    ///
    /// # Errors
    ///
    /// Returns the fetch error after recording it as `FetchStatus::Failed`.
    pub async fn load(&self) -> FolioResult<usize> {
        self.state.lock().begin_loading();
        let snapshot = self.fetcher.fetch_all().await;
        let result = snapshot.as_ref().map(Vec::len).map_err(|e| e.clone());
        apply_and_notify(&self.state, &self.event_tx, snapshot);
        result
    }

    /// Start following live updates, replacing any previous subscription
    pub fn watch(&self) -> FolioResult<()> {
        self.state.lock().begin_loading();

        let state = self.state.clone();
        let event_tx = self.event_tx.clone();
        let subscribed = self
            .fetcher
            .subscribe(move |snapshot| apply_and_notify(&state, &event_tx, snapshot));

        match subscribed {
            Ok(subscription) => {
                let previous = self.subscription.lock().replace(subscription);
                if let Some(previous) = previous {
                    previous.cancel();
                }
                info!(collection = %self.fetcher.query().collection, "Gallery watching");
                Ok(())
            }
            Err(e) => {
                apply_and_notify(&self.state, &self.event_tx, Err(e.clone()));
                Err(e)
            }
        }
    }

    pub fn is_watching(&self) -> bool {
        self.subscription
            .lock()
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    /// Record raw input and restart the search quiet interval
    pub fn set_search_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.lock().set_search_text(text.clone());
        self.debouncer.push(text);
    }

    /// Apply search text immediately, skipping the quiet interval
    pub fn submit_search(&self, text: impl Into<String>) -> bool {
        let text = text.into();
        self.debouncer.cancel();
        self.mutate(|state| {
            state.set_search_text(text.clone());
            state.apply_debounced_search(text)
        })
    }

    pub fn set_category(&self, category: CategoryFilter) -> bool {
        self.mutate(|state| state.set_category(category))
    }

    pub fn set_sort_order(&self, order: SortOrder) -> bool {
        self.mutate(|state| state.set_sort_order(order))
    }

    pub fn set_view_mode(&self, mode: ViewMode) -> bool {
        self.mutate(|state| state.set_view_mode(mode))
    }

    /// Reset search and category, dropping any pending search
    pub fn clear_filters(&self) -> bool {
        self.debouncer.cancel();
        self.mutate(GalleryState::clear_filters)
    }

    /// Feed a visibility change to the reveal tracker
    pub fn on_visibility(&self, id: &ProjectId, ratio: f64) -> bool {
        self.state.lock().reveal_mut().on_visibility(id, ratio)
    }

    pub fn is_revealed(&self, id: &ProjectId) -> bool {
        self.state.lock().reveal().is_revealed(id)
    }

    pub fn visible(&self) -> Vec<ProjectRecord> {
        self.state.lock().visible().to_vec()
    }

    pub fn categories(&self) -> CategorySet {
        self.state.lock().categories().clone()
    }

    pub fn status(&self) -> FetchStatus {
        self.state.lock().status().clone()
    }

    pub fn activate(&self, id: &ProjectId) -> Option<String> {
        self.state.lock().activate(id)
    }

    /// Run `f` against the current state
    pub fn with_state<R>(&self, f: impl FnOnce(&GalleryState) -> R) -> R {
        f(&self.state.lock())
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<GalleryEvent> {
        self.event_tx.subscribe()
    }

    /// Cancel the live subscription and any pending search; idempotent
    pub fn shutdown(&self) {
        let subscription = self.subscription.lock().take();
        if let Some(subscription) = subscription {
            subscription.cancel();
            info!("Gallery stopped watching");
        }
        self.debouncer.cancel();
    }

    fn mutate(&self, f: impl FnOnce(&mut GalleryState) -> bool) -> bool {
        let (changed, visible) = {
            let mut state = self.state.lock();
            let changed = f(&mut state);
            (changed, state.visible().len())
        };
        if changed {
            let _ = self.event_tx.send(GalleryEvent::ResultsChanged { visible });
        }
        changed
    }
}

impl Drop for Gallery {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn apply_and_notify(state: &SharedState, event_tx: &broadcast::Sender<GalleryEvent>, snapshot: Snapshot) {
    let failure = snapshot.as_ref().err().map(ToString::to_string);
    let (changed, count, visible) = {
        let mut state = state.lock();
        let changed = state.apply_snapshot(snapshot);
        (changed, state.raw().len(), state.visible().len())
    };

    let _ = event_tx.send(match failure {
        Some(message) => GalleryEvent::LoadFailed { message },
        None => GalleryEvent::Loaded { count },
    });
    if changed {
        let _ = event_tx.send(GalleryEvent::ResultsChanged { visible });
    }
}
