//! User-controlled query state and the derived category set

use crate::pipeline::PipelineQuery;
use crate::types::{labels_equal, CategoryFilter, ProjectRecord, SortOrder, ViewMode, ALL_CATEGORIES};

/// Ephemeral gallery controls; never persisted
///
/// Each setter replaces its field and reports whether the value changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    search_text: String,
    debounced_search_text: String,
    active_category: CategoryFilter,
    sort_order: SortOrder,
    view_mode: ViewMode,
}

impl QueryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn debounced_search_text(&self) -> &str {
        &self.debounced_search_text
    }

    pub fn active_category(&self) -> &CategoryFilter {
        &self.active_category
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) -> bool {
        replace(&mut self.search_text, text.into())
    }

    pub fn set_debounced_search_text(&mut self, text: impl Into<String>) -> bool {
        replace(&mut self.debounced_search_text, text.into())
    }

    pub fn set_active_category(&mut self, category: CategoryFilter) -> bool {
        replace(&mut self.active_category, category)
    }

    pub fn set_sort_order(&mut self, order: SortOrder) -> bool {
        replace(&mut self.sort_order, order)
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) -> bool {
        replace(&mut self.view_mode, mode)
    }

    /// Reset search (raw and debounced) and category; sort and view stay
    pub fn clear_filters(&mut self) -> bool {
        let a = self.set_search_text("");
        let b = self.set_debounced_search_text("");
        let c = self.set_active_category(CategoryFilter::All);
        a || b || c
    }

    /// Inputs of the filter-sort pipeline
    pub fn pipeline_query(&self) -> PipelineQuery {
        PipelineQuery {
            search: self.debounced_search_text.clone(),
            category: self.active_category.clone(),
            sort: self.sort_order,
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// Distinct category labels of a raw list, in order of first appearance
///
/// Labels differing only by case collapse onto the first spelling seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySet {
    labels: Vec<String>,
}

impl CategorySet {
    pub fn from_records(records: &[ProjectRecord]) -> Self {
        let mut labels: Vec<String> = Vec::new();
        for label in records.iter().flat_map(|r| r.categories.iter()) {
            if !labels.iter().any(|l| labels_equal(l, label)) {
                labels.push(label.clone());
            }
        }
        Self { labels }
    }

    /// Distinct labels, without the "All" sentinel
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Pill labels: "All" followed by every distinct label
    pub fn pills(&self) -> Vec<String> {
        std::iter::once(ALL_CATEGORIES.to_string())
            .chain(self.labels.iter().cloned())
            .collect()
    }

    /// Whether `filter` can still match something in this set
    pub fn admits(&self, filter: &CategoryFilter) -> bool {
        match filter {
            CategoryFilter::All => true,
            CategoryFilter::Label(label) => self.labels.iter().any(|l| labels_equal(l, label)),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters_report_changes() {
        let mut q = QueryState::new();
        assert!(q.set_search_text("bet"));
        assert!(!q.set_search_text("bet"));
        assert!(q.set_sort_order(SortOrder::TitleAsc));
        assert!(!q.set_sort_order(SortOrder::TitleAsc));
        assert!(q.set_view_mode(ViewMode::List));
        assert!(q.set_active_category(CategoryFilter::from_label("Web")));
        assert_eq!(q.search_text(), "bet");
        assert_eq!(q.debounced_search_text(), "");
    }

    #[test]
    fn test_defaults() {
        let q = QueryState::new();
        assert_eq!(q.sort_order(), SortOrder::MostRecent);
        assert_eq!(q.view_mode(), ViewMode::Grid);
        assert!(q.active_category().is_all());
    }

    #[test]
    fn test_pipeline_query_uses_debounced_text() {
        let mut q = QueryState::new();
        q.set_search_text("gam");
        assert_eq!(q.pipeline_query().search, "");
        q.set_debounced_search_text("gam");
        assert_eq!(q.pipeline_query().search, "gam");
    }

    #[test]
    fn test_clear_filters_keeps_sort_and_view() {
        let mut q = QueryState::new();
        q.set_search_text("x");
        q.set_debounced_search_text("x");
        q.set_active_category(CategoryFilter::from_label("Web"));
        q.set_sort_order(SortOrder::TitleDesc);
        q.set_view_mode(ViewMode::List);

        assert!(q.clear_filters());
        assert!(!q.clear_filters());
        assert_eq!(q.search_text(), "");
        assert!(q.active_category().is_all());
        assert_eq!(q.sort_order(), SortOrder::TitleDesc);
        assert_eq!(q.view_mode(), ViewMode::List);
    }

    #[test]
    fn test_category_set_first_appearance_order() {
        let records = vec![
            ProjectRecord::new("1", "A").with_categories(["Web", "Branding"]),
            ProjectRecord::new("2", "B").with_categories(["UI/UX", "web"]),
            ProjectRecord::new("3", "C"),
        ];
        let set = CategorySet::from_records(&records);
        assert_eq!(set.labels(), &["Web", "Branding", "UI/UX"]);
        assert_eq!(set.pills(), vec!["All", "Web", "Branding", "UI/UX"]);
        assert_eq!(set, CategorySet::from_records(&records));
    }

    #[test]
    fn test_category_set_admits() {
        let records = vec![ProjectRecord::new("1", "A").with_categories(["Web"])];
        let set = CategorySet::from_records(&records);
        assert!(set.admits(&CategoryFilter::All));
        assert!(set.admits(&CategoryFilter::from_label("WEB")));
        assert!(!set.admits(&CategoryFilter::from_label("Print")));
        assert!(CategorySet::from_records(&[]).is_empty());
    }
}
