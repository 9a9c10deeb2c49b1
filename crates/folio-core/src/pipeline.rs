//! Filter–sort pipeline
//!
//! A pure function from (raw list, search text, category, sort order) to the
//! list the gallery renders. Same inputs always give the same output in the
//! same order: filtering preserves input order and every sort is stable.

use std::cmp::Ordering;

use chrono::NaiveDateTime;

use crate::types::{CategoryFilter, ProjectRecord, SortOrder};

/// Pipeline inputs besides the raw list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineQuery {
    /// Search text (already debounced)
    pub search: String,
    pub category: CategoryFilter,
    pub sort: SortOrder,
}

impl PipelineQuery {
    pub fn new(search: impl Into<String>, category: CategoryFilter, sort: SortOrder) -> Self {
        Self {
            search: search.into(),
            category,
            sort,
        }
    }
}

/// Filter then sort `records`
pub fn apply(records: &[ProjectRecord], query: &PipelineQuery) -> Vec<ProjectRecord> {
    let needle = query.search.trim().to_lowercase();
    let mut result: Vec<ProjectRecord> = records
        .iter()
        .filter(|r| matches_search(r, &needle))
        .filter(|r| query.category.matches(&r.categories))
        .cloned()
        .collect();
    sort_records(&mut result, query.sort);
    result
}

/// Case-insensitive substring match on title, summary and tags
///
/// `needle` must already be lowercased; an empty needle matches everything.
pub fn matches_search(record: &ProjectRecord, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    record.title.to_lowercase().contains(needle)
        || record.summary.to_lowercase().contains(needle)
        || record.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

/// Stable in-place sort by `order`
pub fn sort_records(records: &mut Vec<ProjectRecord>, order: SortOrder) {
    match order {
        SortOrder::MostRecent | SortOrder::Oldest => {
            // Parse each date once rather than on every comparison.
            let mut keyed: Vec<(Option<NaiveDateTime>, ProjectRecord)> =
                records.drain(..).map(|r| (r.date_key(), r)).collect();
            if order == SortOrder::MostRecent {
                keyed.sort_by(|a, b| b.0.cmp(&a.0));
            } else {
                keyed.sort_by(|a, b| a.0.cmp(&b.0));
            }
            records.extend(keyed.into_iter().map(|(_, r)| r));
        }
        SortOrder::TitleAsc => records.sort_by(|a, b| compare_text(&a.title, &b.title)),
        SortOrder::TitleDesc => records.sort_by(|a, b| compare_text(&b.title, &a.title)),
        SortOrder::Category => records.sort_by(|a, b| {
            match (a.categories.first(), b.categories.first()) {
                (Some(x), Some(y)) => compare_text(x, y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }
        }),
        SortOrder::Unsorted => {}
    }
}

/// Case-insensitive ordering with a case-sensitive tie-break
fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::normalize_snapshot;
    use crate::query::CategorySet;
    use crate::types::RawDocument;
    use serde_json::json;

    fn scenario() -> Vec<ProjectRecord> {
        let docs: Vec<_> = [
            json!({ "id": "1", "title": "Alpha", "tags": ["Web"], "year": "2023" }),
            json!({ "id": "2", "title": "Beta", "tags": ["Branding"], "year": "2024" }),
            json!({ "id": "3", "title": "Gamma", "tags": ["Web"], "year": "2022" }),
        ]
        .into_iter()
        .filter_map(RawDocument::from_value)
        .collect();
        normalize_snapshot(&docs)
    }

    fn ids(records: &[ProjectRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_category_and_most_recent() {
        let q = PipelineQuery::new("", CategoryFilter::from_label("Web"), SortOrder::parse("most-recent"));
        assert_eq!(ids(&apply(&scenario(), &q)), vec!["1", "3"]);
    }

    #[test]
    fn test_tag_labels_feed_the_category_set() {
        let set = CategorySet::from_records(&scenario());
        assert_eq!(set.pills(), vec!["All", "Web", "Branding"]);
    }

    #[test]
    fn test_search_and_a_z() {
        let q = PipelineQuery::new("bet", CategoryFilter::All, SortOrder::parse("a-z"));
        assert_eq!(ids(&apply(&scenario(), &q)), vec!["2"]);
    }

    #[test]
    fn test_z_a() {
        let q = PipelineQuery::new("", CategoryFilter::All, SortOrder::parse("z-a"));
        assert_eq!(ids(&apply(&scenario(), &q)), vec!["3", "2", "1"]);
    }

    #[test]
    fn test_oldest() {
        let q = PipelineQuery::new("", CategoryFilter::All, SortOrder::Oldest);
        assert_eq!(ids(&apply(&scenario(), &q)), vec!["3", "1", "2"]);
    }

    #[test]
    fn test_empty_raw_list() {
        let q = PipelineQuery::new("anything", CategoryFilter::from_label("Web"), SortOrder::TitleAsc);
        assert!(apply(&[], &q).is_empty());
    }

    #[test]
    fn test_unknown_sort_passes_through() {
        let q = PipelineQuery::new("", CategoryFilter::All, SortOrder::parse("popularity"));
        assert_eq!(ids(&apply(&scenario(), &q)), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_search_matches_summary_and_tags_case_insensitively() {
        let records = vec![
            ProjectRecord::new("a", "Night Bites").with_summary("Food delivery app"),
            ProjectRecord::new("b", "Corporate").with_tags(["Accessibility"]),
            ProjectRecord::new("c", "Other"),
        ];
        let by_summary = PipelineQuery::new("DELIVERY", CategoryFilter::All, SortOrder::Unsorted);
        assert_eq!(ids(&apply(&records, &by_summary)), vec!["a"]);

        let by_tag = PipelineQuery::new("access", CategoryFilter::All, SortOrder::Unsorted);
        assert_eq!(ids(&apply(&records, &by_tag)), vec!["b"]);

        let blank = PipelineQuery::new("   ", CategoryFilter::All, SortOrder::Unsorted);
        assert_eq!(apply(&records, &blank).len(), 3);
    }

    #[test]
    fn test_missing_and_malformed_dates_sort_oldest() {
        let records = vec![
            ProjectRecord::new("none", "A"),
            ProjectRecord::new("bad", "B").with_date("sometime"),
            ProjectRecord::new("new", "C").with_date("2025-06-15"),
            ProjectRecord::new("old", "D").with_date("2019"),
        ];
        let recent = apply(&records, &PipelineQuery::new("", CategoryFilter::All, SortOrder::MostRecent));
        assert_eq!(ids(&recent), vec!["new", "old", "none", "bad"]);

        let oldest = apply(&records, &PipelineQuery::new("", CategoryFilter::All, SortOrder::Oldest));
        assert_eq!(ids(&oldest), vec!["none", "bad", "old", "new"]);
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let records = vec![
            ProjectRecord::new("x", "Same").with_date("2024"),
            ProjectRecord::new("y", "Same").with_date("2024"),
            ProjectRecord::new("z", "Same").with_date("2024"),
        ];
        for order in SortOrder::ALL {
            let out = apply(&records, &PipelineQuery::new("", CategoryFilter::All, order));
            assert_eq!(ids(&out), vec!["x", "y", "z"], "order {:?}", order);
        }
    }

    #[test]
    fn test_title_sort_ignores_case() {
        let records = vec![
            ProjectRecord::new("1", "beta"),
            ProjectRecord::new("2", "Alpha"),
            ProjectRecord::new("3", "alpha"),
        ];
        let out = apply(&records, &PipelineQuery::new("", CategoryFilter::All, SortOrder::TitleAsc));
        assert_eq!(ids(&out), vec!["2", "3", "1"]);
    }

    #[test]
    fn test_category_sort_uncategorized_last() {
        let records = vec![
            ProjectRecord::new("1", "A"),
            ProjectRecord::new("2", "B").with_categories(["UI/UX Design"]),
            ProjectRecord::new("3", "C").with_categories(["Branding"]),
        ];
        let out = apply(&records, &PipelineQuery::new("", CategoryFilter::All, SortOrder::Category));
        assert_eq!(ids(&out), vec!["3", "2", "1"]);
    }
}
