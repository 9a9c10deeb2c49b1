//! Project records and the normalization boundary
//!
//! Documents arrive from the store loosely typed: fields may be missing,
//! label lists may be comma-joined strings, years may be numbers. Every
//! document is normalized once, on arrival, into a strict [`ProjectRecord`];
//! everything downstream assumes normalized input.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ProjectId;

/// Image shown when a project has no image of its own
pub const PLACEHOLDER_IMAGE: &str = "https://placehold.co/600x400?text=No+Image";

/// Title shown when a project has a blank title
pub const UNTITLED_PROJECT: &str = "Untitled Project";

const NO_DESCRIPTION: &str = "No description available.";

/// A document as delivered by the store: its id plus untyped fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Build from a JSON object carrying its own `id` field
    ///
    /// Returns `None` for non-objects and for objects without a usable id.
    pub fn from_value(value: Value) -> Option<Self> {
        let Value::Object(mut fields) = value else {
            return None;
        };
        let id = match fields.remove("id") {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => return None,
        };
        Some(Self { id, fields })
    }

    /// Build from an `(id, object)` pair as found in keyed exports
    pub fn from_keyed(id: &str, value: Value) -> Option<Self> {
        match value {
            Value::Object(mut fields) if !id.trim().is_empty() => {
                fields.remove("id");
                Some(Self::new(id, fields))
            }
            _ => None,
        }
    }
}

/// Outcome metrics shown on the detail page, in percent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProjectStats {
    pub drop: f64,
    pub ctr: f64,
    pub growth: f64,
}

impl ProjectStats {
    fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        Some(Self {
            drop: number_like(obj.get("drop")).unwrap_or(0.0),
            ctr: number_like(obj.get("ctr")).unwrap_or(0.0),
            growth: number_like(obj.get("growth")).unwrap_or(0.0),
        })
    }

    /// Growth clamped for use as a progress-bar width
    pub fn growth_bar(&self) -> f64 {
        self.growth.clamp(0.0, 100.0)
    }
}

/// One portfolio entry, normalized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: ProjectId,
    pub title: String,
    pub summary: String,
    pub description: String,
    pub image_url: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    /// Raw date string; only used as a chronological sort key
    pub date: Option<String>,
    pub gallery: Vec<String>,
    pub prototype_url: Option<String>,
    pub stats: Option<ProjectStats>,
}

impl ProjectRecord {
    /// Minimal record; mostly useful for tests and fixtures
    pub fn new(id: impl Into<ProjectId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            summary: String::new(),
            description: String::new(),
            image_url: None,
            categories: Vec::new(),
            tags: Vec::new(),
            date: None,
            gallery: Vec::new(),
            prototype_url: None,
            stats: None,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// Normalize a store document into a record
    ///
    /// Never fails: missing or mistyped fields fall back to empty values.
    pub fn from_document(doc: &RawDocument) -> Self {
        let fields = &doc.fields;

        let gallery = label_list(fields, &["gallery"]);
        let summary = string_field(fields, &["summary", "description"]).unwrap_or_default();
        let description = string_field(fields, &["description", "summary"]).unwrap_or_default();
        let image_url = string_field(fields, &["imageUrl", "image"]).or_else(|| gallery.first().cloned());

        // Documents without a category field carry their labels as tags.
        let tags = label_list(fields, &["pills", "tags"]);
        let categories = if has_field(fields, &["categories", "category"]) {
            label_list(fields, &["categories", "category"])
        } else {
            tags.clone()
        };

        Self {
            id: ProjectId::new(doc.id.clone()),
            title: string_field(fields, &["title"]).unwrap_or_default(),
            summary,
            description,
            image_url,
            categories,
            tags,
            date: date_field(fields, &["date", "year"]),
            gallery,
            prototype_url: string_field(fields, &["prototype"]).map(|p| with_scheme(&p)),
            stats: fields.get("stats").and_then(ProjectStats::from_value),
        }
    }

    /// Title for display, never blank
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED_PROJECT
        } else {
            &self.title
        }
    }

    /// Image for display, falling back to `placeholder`
    pub fn display_image<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.image_url.as_deref().unwrap_or(placeholder)
    }

    /// Summary cut to `max_chars` characters, with an ellipsis when cut
    pub fn excerpt(&self, max_chars: usize) -> String {
        if self.summary.trim().is_empty() {
            return NO_DESCRIPTION.to_string();
        }
        if self.summary.chars().count() > max_chars {
            let cut: String = self.summary.chars().take(max_chars).collect();
            format!("{}...", cut)
        } else {
            self.summary.clone()
        }
    }

    /// First `n` tags, for card previews
    pub fn preview_tags(&self, n: usize) -> &[String] {
        &self.tags[..self.tags.len().min(n)]
    }

    /// Gallery images other than the hero image
    pub fn extra_gallery(&self) -> &[String] {
        if self.gallery.len() > 1 {
            &self.gallery[1..]
        } else {
            &[]
        }
    }

    /// Parsed chronological sort key; `None` sorts as earliest
    pub fn date_key(&self) -> Option<NaiveDateTime> {
        self.date.as_deref().and_then(parse_date_key)
    }

    /// Route of the detail view for this project
    pub fn detail_route(&self) -> String {
        format!("/project/{}", self.id)
    }

    /// Whether the record carries `label` (case-insensitive)
    pub fn has_category(&self, label: &str) -> bool {
        self.categories.iter().any(|c| super::labels_equal(c, label))
    }
}

/// Parse a date string into a sort key
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DD`, `YYYY-MM` and `YYYY`.
pub fn parse_date_key(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    if raw.len() == 4 && raw.bytes().all(|b| b.is_ascii_digit()) {
        let year: i32 = raw.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1).map(|d| d.and_time(NaiveTime::MIN));
    }
    None
}

/// First non-blank string (or number) among `keys`
fn string_field(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match fields.get(*key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Date-like field: strings, numeric years, or `{seconds, nanoseconds}` timestamps
fn date_field(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    string_field(fields, keys).or_else(|| {
        keys.iter().find_map(|key| {
            let obj = fields.get(*key)?.as_object()?;
            let seconds = obj.get("seconds").or_else(|| obj.get("_seconds"))?.as_i64()?;
            let nanos = obj
                .get("nanoseconds")
                .or_else(|| obj.get("_nanoseconds"))
                .and_then(Value::as_u64)
                .unwrap_or(0);
            DateTime::from_timestamp(seconds, nanos as u32).map(|ts| ts.to_rfc3339())
        })
    })
}

/// Label list from the first present key among `keys`
///
/// Arrays keep their string and number elements; strings are split on commas.
/// Labels are trimmed and blanks dropped.
fn has_field(fields: &Map<String, Value>, keys: &[&str]) -> bool {
    keys.iter().any(|key| fields.get(*key).is_some_and(|v| !v.is_null()))
}

fn label_list(fields: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    let Some(value) = keys.iter().find_map(|key| fields.get(*key).filter(|v| !v.is_null())) else {
        return Vec::new();
    };
    let labels: Vec<String> = match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Value::String(s) => s.split(',').map(|part| part.trim().to_string()).collect(),
        _ => Vec::new(),
    };
    labels.into_iter().filter(|l| !l.is_empty()).collect()
}

fn number_like(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn with_scheme(link: &str) -> String {
    let link = link.trim();
    if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else {
        format!("https://{}", link)
    }
}
