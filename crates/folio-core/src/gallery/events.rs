//! Gallery lifecycle events

/// Events emitted by a [`Gallery`](super::Gallery) to its listeners
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryEvent {
    /// A snapshot was applied
    Loaded {
        /// Records in the raw list
        count: usize,
    },
    /// The store could not deliver a snapshot
    LoadFailed {
        message: String,
    },
    /// The rendered list changed
    ResultsChanged {
        /// Records now visible
        visible: usize,
    },
    /// The search text settled after the quiet interval
    SearchSettled {
        query: String,
    },
}

impl GalleryEvent {
    /// Whether this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, GalleryEvent::LoadFailed { .. })
    }
}
