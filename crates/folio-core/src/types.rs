//! Core types for Folio

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FolioError;

mod project;

pub use project::{
    parse_date_key, ProjectRecord, ProjectStats, RawDocument, PLACEHOLDER_IMAGE, UNTITLED_PROJECT,
};

/// Unique identifier for a project
///
/// Assigned by the document store when the project is created; the gallery
/// treats it as opaque and uses it as the rendering key and detail route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub String);

impl ProjectId {
    /// Create a ProjectId from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ProjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Sort order applied after filtering
///
/// Parsing never fails: unrecognized keys become [`SortOrder::Unsorted`],
/// which leaves the filtered list in its input order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Newest first; missing or malformed dates last
    #[default]
    MostRecent,
    /// Oldest first; missing or malformed dates first
    Oldest,
    /// Title ascending
    TitleAsc,
    /// Title descending
    TitleDesc,
    /// First category label ascending; uncategorized last
    Category,
    /// Input order
    Unsorted,
}

impl SortOrder {
    /// Every selectable sort order, in menu order
    pub const ALL: [SortOrder; 5] = [
        SortOrder::MostRecent,
        SortOrder::Oldest,
        SortOrder::TitleAsc,
        SortOrder::TitleDesc,
        SortOrder::Category,
    ];

    /// Parse a sort key as used by the gallery controls
    pub fn parse(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "most-recent" | "recent" | "newest" => SortOrder::MostRecent,
            "oldest" => SortOrder::Oldest,
            "a-z" | "title" => SortOrder::TitleAsc,
            "z-a" => SortOrder::TitleDesc,
            "category" => SortOrder::Category,
            _ => SortOrder::Unsorted,
        }
    }

    /// Canonical key for this order
    pub fn as_key(&self) -> &'static str {
        match self {
            SortOrder::MostRecent => "most-recent",
            SortOrder::Oldest => "oldest",
            SortOrder::TitleAsc => "a-z",
            SortOrder::TitleDesc => "z-a",
            SortOrder::Category => "category",
            SortOrder::Unsorted => "unsorted",
        }
    }

    /// Human-readable label for menus
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::MostRecent => "Newest First",
            SortOrder::Oldest => "Oldest First",
            SortOrder::TitleAsc => "Name (A-Z)",
            SortOrder::TitleDesc => "Name (Z-A)",
            SortOrder::Category => "Category",
            SortOrder::Unsorted => "Unsorted",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_key())
    }
}

impl From<&str> for SortOrder {
    fn from(key: &str) -> Self {
        SortOrder::parse(key)
    }
}

/// Gallery layout; purely presentational
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Grid => "grid",
            ViewMode::List => "list",
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            other => Err(FolioError::InvalidOperation(format!(
                "unknown view mode '{}', expected grid or list",
                other
            ))),
        }
    }
}

/// Label shown for the "no category filter" pill
pub const ALL_CATEGORIES: &str = "All";

/// Active category selection
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    /// No filtering
    #[default]
    All,
    /// Keep only records carrying this label (case-insensitive)
    Label(String),
}

impl CategoryFilter {
    /// Build a filter from a pill label; "All" (any case) and blank mean no filter
    pub fn from_label(label: &str) -> Self {
        let trimmed = label.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_CATEGORIES) {
            CategoryFilter::All
        } else {
            CategoryFilter::Label(trimmed.to_string())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, CategoryFilter::All)
    }

    /// Label as displayed on the pill
    pub fn label(&self) -> &str {
        match self {
            CategoryFilter::All => ALL_CATEGORIES,
            CategoryFilter::Label(label) => label,
        }
    }

    /// Whether a record with these categories passes the filter
    pub fn matches(&self, categories: &[String]) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Label(wanted) => categories.iter().any(|c| labels_equal(c, wanted)),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Case-insensitive label comparison (Unicode-aware)
pub(crate) fn labels_equal(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}
