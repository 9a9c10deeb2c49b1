//! Gallery configuration
//!
//! Every field has a default, so an empty TOML file is a valid config:
//!
//! ```toml
//! collection = "projects"
//! debounce_ms = 300
//! reveal_threshold = 0.1
//! root_margin = 50.0
//! featured_limit = 12
//! poll_interval_ms = 1000
//! placeholder_image = "https://placehold.co/600x400?text=No+Image"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::debounce::DEFAULT_DEBOUNCE;
use crate::error::{FolioError, FolioResult};
use crate::reveal::{RevealOptions, DEFAULT_ROOT_MARGIN, DEFAULT_STAGGER, DEFAULT_THRESHOLD};
use crate::store::{CollectionQuery, DEFAULT_COLLECTION, DEFAULT_POLL_INTERVAL};
use crate::types::PLACEHOLDER_IMAGE;

/// Records shown in the featured section
pub const DEFAULT_FEATURED_LIMIT: usize = 12;
/// Summary length on cards, in characters
pub const DEFAULT_EXCERPT_CHARS: usize = 110;
/// Tags previewed on each card
pub const DEFAULT_PREVIEW_TAGS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolioConfig {
    pub collection: String,
    pub debounce_ms: u64,
    pub reveal_threshold: f64,
    pub root_margin: f64,
    pub stagger_ms: u64,
    pub featured_limit: usize,
    /// Field the featured query orders by, descending
    pub featured_order_by: Option<String>,
    /// Re-read interval for exports whose directory can't be watched
    pub poll_interval_ms: u64,
    pub placeholder_image: String,
    pub excerpt_chars: usize,
    pub preview_tags: usize,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            collection: DEFAULT_COLLECTION.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            reveal_threshold: DEFAULT_THRESHOLD,
            root_margin: DEFAULT_ROOT_MARGIN,
            stagger_ms: DEFAULT_STAGGER.as_millis() as u64,
            featured_limit: DEFAULT_FEATURED_LIMIT,
            featured_order_by: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            placeholder_image: PLACEHOLDER_IMAGE.to_string(),
            excerpt_chars: DEFAULT_EXCERPT_CHARS,
            preview_tags: DEFAULT_PREVIEW_TAGS,
        }
    }
}

impl FolioConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> FolioResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> FolioResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), collection = %config.collection, "Loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> FolioResult<()> {
        if self.collection.trim().is_empty() {
            return Err(FolioError::Configuration(
                "collection must not be empty".to_string(),
            ));
        }
        if self.debounce_ms == 0 {
            return Err(FolioError::Configuration(
                "debounce_ms must be greater than zero".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.reveal_threshold) {
            return Err(FolioError::Configuration(format!(
                "reveal_threshold must be within 0..=1, got {}",
                self.reveal_threshold
            )));
        }
        if !self.root_margin.is_finite() || self.root_margin < 0.0 {
            return Err(FolioError::Configuration(format!(
                "root_margin must be a non-negative number, got {}",
                self.root_margin
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(FolioError::Configuration(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn reveal_options(&self) -> RevealOptions {
        RevealOptions {
            threshold: self.reveal_threshold,
            root_margin: self.root_margin,
            stagger: Duration::from_millis(self.stagger_ms),
        }
    }

    /// Query for the full gallery
    pub fn collection_query(&self) -> CollectionQuery {
        CollectionQuery::new(self.collection.clone())
    }

    /// Query for the featured section: limited, optionally ordered
    pub fn featured_query(&self) -> CollectionQuery {
        let query = CollectionQuery::new(self.collection.clone()).with_limit(self.featured_limit);
        match &self.featured_order_by {
            Some(field) => query.order_by_desc(field.clone()),
            None => query,
        }
    }
}
