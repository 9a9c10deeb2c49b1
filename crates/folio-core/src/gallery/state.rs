//! Synchronous gallery state machine

use tracing::{debug, info, warn};

use crate::fetch::Snapshot;
use crate::pipeline;
use crate::query::{CategorySet, QueryState};
use crate::reveal::RevealTracker;
use crate::types::{CategoryFilter, ProjectId, ProjectRecord, SortOrder, ViewMode};

/// Where the raw list came from most recently
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed(String),
}

impl FetchStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchStatus::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchStatus::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Raw list, query controls and the derived rendered list
///
/// Every mutation that can change the rendered list recomputes it through the
/// pipeline and returns whether it changed. A changed list (or view mode)
/// starts a new reveal pass.
#[derive(Debug)]
pub struct GalleryState {
    raw: Vec<ProjectRecord>,
    query: QueryState,
    categories: CategorySet,
    visible: Vec<ProjectRecord>,
    status: FetchStatus,
    reveal: RevealTracker,
}

impl GalleryState {
    pub fn new(reveal: RevealTracker) -> Self {
        Self {
            raw: Vec::new(),
            query: QueryState::new(),
            categories: CategorySet::default(),
            visible: Vec::new(),
            status: FetchStatus::Idle,
            reveal,
        }
    }

    pub fn begin_loading(&mut self) {
        self.status = FetchStatus::Loading;
    }

    /// Replace the raw list with a delivered snapshot
    ///
    /// A failed snapshot leaves the raw list empty.
    pub fn apply_snapshot(&mut self, snapshot: Snapshot) -> bool {
        let failed = match snapshot {
            Ok(records) => {
                info!(count = records.len(), "Applying project snapshot");
                self.raw = records;
                self.status = FetchStatus::Ready;
                false
            }
            Err(e) => {
                warn!(error = %e, "Project snapshot failed");
                self.raw.clear();
                self.status = FetchStatus::Failed(e.to_string());
                true
            }
        };

        self.categories = CategorySet::from_records(&self.raw);
        // A failed delivery keeps the selection for when the store recovers.
        if !failed && !self.categories.admits(self.query.active_category()) {
            debug!(
                category = %self.query.active_category(),
                "Active category no longer present, resetting"
            );
            self.query.set_active_category(CategoryFilter::All);
        }
        self.recompute()
    }

    /// Record raw keystrokes; the rendered list waits for the debounced value
    pub fn set_search_text(&mut self, text: impl Into<String>) -> bool {
        self.query.set_search_text(text)
    }

    pub fn apply_debounced_search(&mut self, text: impl Into<String>) -> bool {
        if self.query.set_debounced_search_text(text) {
            self.recompute()
        } else {
            false
        }
    }

    pub fn set_category(&mut self, category: CategoryFilter) -> bool {
        if self.query.set_active_category(category) {
            self.recompute()
        } else {
            false
        }
    }

    pub fn set_sort_order(&mut self, order: SortOrder) -> bool {
        if self.query.set_sort_order(order) {
            self.recompute()
        } else {
            false
        }
    }

    /// Switching layout starts a new reveal pass over the same items
    pub fn set_view_mode(&mut self, mode: ViewMode) -> bool {
        if self.query.set_view_mode(mode) {
            self.rebind();
            true
        } else {
            false
        }
    }

    pub fn clear_filters(&mut self) -> bool {
        if self.query.clear_filters() {
            self.recompute()
        } else {
            false
        }
    }

    pub fn raw(&self) -> &[ProjectRecord] {
        &self.raw
    }

    pub fn visible(&self) -> &[ProjectRecord] {
        &self.visible
    }

    pub fn visible_ids(&self) -> Vec<ProjectId> {
        self.visible.iter().map(|r| r.id.clone()).collect()
    }

    pub fn categories(&self) -> &CategorySet {
        &self.categories
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    /// Detail route for a rendered item; `None` if it is not on screen
    pub fn activate(&self, id: &ProjectId) -> Option<String> {
        self.visible
            .iter()
            .find(|r| &r.id == id)
            .map(ProjectRecord::detail_route)
    }

    pub fn reveal(&self) -> &RevealTracker {
        &self.reveal
    }

    pub fn reveal_mut(&mut self) -> &mut RevealTracker {
        &mut self.reveal
    }

    fn recompute(&mut self) -> bool {
        let next = pipeline::apply(&self.raw, &self.query.pipeline_query());
        if next == self.visible {
            return false;
        }
        debug!(before = self.visible.len(), after = next.len(), "Rendered list changed");
        self.visible = next;
        self.rebind();
        true
    }

    fn rebind(&mut self) {
        let ids = self.visible_ids();
        self.reveal.bind(&ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FolioError;
    use crate::reveal::{GeometryObserver, RevealOptions};

    fn records() -> Vec<ProjectRecord> {
        vec![
            ProjectRecord::new("1", "Alpha").with_tags(["Web"]).with_categories(["Web"]).with_date("2023"),
            ProjectRecord::new("2", "Beta")
                .with_tags(["Branding"])
                .with_categories(["Branding"])
                .with_date("2024"),
            ProjectRecord::new("3", "Gamma").with_tags(["Web"]).with_categories(["Web"]).with_date("2022"),
        ]
    }

    fn observed_state() -> (GalleryState, GeometryObserver) {
        let geometry = GeometryObserver::new();
        let tracker = RevealTracker::new(RevealOptions::default(), Some(Box::new(geometry.clone())));
        (GalleryState::new(tracker), geometry)
    }

    fn ids(state: &GalleryState) -> Vec<&str> {
        state.visible().iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_snapshot_then_filters() {
        let (mut state, _) = observed_state();
        state.begin_loading();
        assert!(state.status().is_loading());

        assert!(state.apply_snapshot(Ok(records())));
        assert_eq!(state.status(), &FetchStatus::Ready);
        assert_eq!(ids(&state), vec!["2", "1", "3"]);

        assert!(state.set_category(CategoryFilter::from_label("Web")));
        assert_eq!(ids(&state), vec!["1", "3"]);
        assert!(!state.set_category(CategoryFilter::from_label("Web")));
    }

    #[test]
    fn test_raw_search_waits_for_debounce() {
        let (mut state, _) = observed_state();
        state.apply_snapshot(Ok(records()));

        assert!(state.set_search_text("bet"));
        assert_eq!(state.visible().len(), 3);
        assert!(state.apply_debounced_search("bet"));
        assert_eq!(ids(&state), vec!["2"]);
    }

    #[test]
    fn test_failed_snapshot_empties_list() {
        let (mut state, _) = observed_state();
        state.apply_snapshot(Ok(records()));
        state.set_category(CategoryFilter::from_label("Web"));

        assert!(state.apply_snapshot(Err(FolioError::Connection("offline".to_string()))));
        assert!(state.visible().is_empty());
        assert!(state.raw().is_empty());
        assert_eq!(state.status().error(), Some("Connection error: offline"));
        assert_eq!(state.query().active_category(), &CategoryFilter::from_label("Web"));
    }

    #[test]
    fn test_category_survives_outage_and_recovery() {
        let (mut state, _) = observed_state();
        state.apply_snapshot(Ok(records()));
        state.set_category(CategoryFilter::from_label("Branding"));

        state.apply_snapshot(Err(FolioError::Connection("offline".to_string())));
        state.apply_snapshot(Ok(records()));

        assert_eq!(state.status(), &FetchStatus::Ready);
        assert_eq!(state.query().active_category(), &CategoryFilter::from_label("Branding"));
        assert_eq!(ids(&state), vec!["2"]);
    }

    #[test]
    fn test_vanished_category_resets_to_all() {
        let (mut state, _) = observed_state();
        state.apply_snapshot(Ok(records()));
        state.set_category(CategoryFilter::from_label("Branding"));
        assert_eq!(ids(&state), vec!["2"]);

        let without_branding: Vec<_> = records().into_iter().filter(|r| r.id.as_str() != "2").collect();
        state.apply_snapshot(Ok(without_branding));
        assert!(state.query().active_category().is_all());
        assert_eq!(ids(&state), vec!["1", "3"]);
    }

    #[test]
    fn test_list_change_and_view_mode_rebind_reveal() {
        let (mut state, geometry) = observed_state();
        state.apply_snapshot(Ok(records()));
        assert_eq!(geometry.observed().len(), 3);

        let first = ProjectId::from("1");
        assert!(state.reveal_mut().on_visibility(&first, 1.0));
        assert!(state.reveal().is_revealed(&first));

        assert!(state.set_view_mode(ViewMode::List));
        assert!(!state.reveal().is_revealed(&first));
        assert_eq!(geometry.observed().len(), 3);

        state.set_sort_order(SortOrder::TitleAsc);
        assert_eq!(ids(&state), vec!["1", "2", "3"]);
        assert_eq!(geometry.observed().len(), 3);
    }

    #[test]
    fn test_unchanged_list_keeps_reveal_flags() {
        let (mut state, _) = observed_state();
        state.apply_snapshot(Ok(records()));
        let first = ProjectId::from("1");
        state.reveal_mut().on_visibility(&first, 1.0);

        // Same records again: nothing to re-render.
        assert!(!state.apply_snapshot(Ok(records())));
        assert!(state.reveal().is_revealed(&first));
    }

    #[test]
    fn test_clear_filters_restores_full_list() {
        let (mut state, _) = observed_state();
        state.apply_snapshot(Ok(records()));
        state.set_search_text("zzz");
        state.apply_debounced_search("zzz");
        assert!(state.visible().is_empty());

        assert!(state.clear_filters());
        assert_eq!(state.visible().len(), 3);
        assert_eq!(state.query().search_text(), "");
    }

    #[test]
    fn test_activate_only_visible_items() {
        let (mut state, _) = observed_state();
        state.apply_snapshot(Ok(records()));
        state.set_category(CategoryFilter::from_label("Branding"));

        assert_eq!(state.activate(&ProjectId::from("2")).as_deref(), Some("/project/2"));
        assert_eq!(state.activate(&ProjectId::from("1")), None);
    }
}
