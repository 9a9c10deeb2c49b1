//! Reveal-on-scroll trigger
//!
//! Each rendered item gets a one-time "revealed" flag, set the first time at
//! least `threshold` of it is visible inside the viewport grown by
//! `root_margin`. The flag is presentational only.
//!
//! ```text
//!   bind(items) ──► observe each ──► on_visibility(id, ratio)
//!        ▲                                 │ ratio >= threshold
//!        │                                 ▼
//!   list/view changed              mark revealed, unobserve
//! ```
//!
//! Visibility comes from a [`VisibilityObserver`]. When none is installed, or
//! observing an item fails, the item is treated as revealed right away.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::error::FolioResult;
use crate::types::ProjectId;

/// Fraction of an item that must be visible to reveal it
pub const DEFAULT_THRESHOLD: f64 = 0.1;
/// Pre-trigger margin around the viewport
pub const DEFAULT_ROOT_MARGIN: f64 = 50.0;
/// Entrance delay added per item index
pub const DEFAULT_STAGGER: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealOptions {
    pub threshold: f64,
    pub root_margin: f64,
    pub stagger: Duration,
}

impl Default for RevealOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            root_margin: DEFAULT_ROOT_MARGIN,
            stagger: DEFAULT_STAGGER,
        }
    }
}

/// Axis-aligned rectangle in layout units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Grow by `margin` on every side
    pub fn expand(&self, margin: f64) -> Self {
        Self::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }

    /// Overlapping region, if any (touching edges count as overlap)
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);
        if right < left || bottom < top {
            None
        } else {
            Some(Rect::new(left, top, right - left, bottom - top))
        }
    }
}

/// Visible fraction of `item` within `viewport` grown by `root_margin`
///
/// A zero-area item counts as fully visible when it lies inside the area.
pub fn intersection_ratio(item: &Rect, viewport: &Rect, root_margin: f64) -> f64 {
    let root = viewport.expand(root_margin);
    match item.intersect(&root) {
        None => 0.0,
        Some(_) if item.area() == 0.0 => 1.0,
        Some(overlap) => (overlap.area() / item.area()).clamp(0.0, 1.0),
    }
}

/// Staggered entrance delay for the item at `index`
pub fn reveal_delay(index: usize, stagger: Duration) -> Duration {
    stagger.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
}

/// One visibility observation
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityEntry {
    pub item: ProjectId,
    pub ratio: f64,
}

/// Source of visibility changes for rendered items
pub trait VisibilityObserver: Send {
    /// Start watching an item
    ///
    /// Returns `FolioError::ObservationUnavailable` when the surface cannot
    /// report visibility.
    fn observe(&mut self, item: &ProjectId) -> FolioResult<()>;

    /// Stop watching an item
    fn unobserve(&mut self, item: &ProjectId);

    /// Stop watching everything
    fn disconnect(&mut self);
}

/// Tracks per-item reveal flags for one render pass at a time
pub struct RevealTracker {
    options: RevealOptions,
    observer: Option<Box<dyn VisibilityObserver>>,
    bound: HashSet<ProjectId>,
    observing: HashSet<ProjectId>,
    revealed: HashSet<ProjectId>,
}

impl RevealTracker {
    pub fn new(options: RevealOptions, observer: Option<Box<dyn VisibilityObserver>>) -> Self {
        Self {
            options,
            observer,
            bound: HashSet::new(),
            observing: HashSet::new(),
            revealed: HashSet::new(),
        }
    }

    /// Tracker with no observer: every bound item is revealed immediately
    pub fn always_revealed(options: RevealOptions) -> Self {
        Self::new(options, None)
    }

    pub fn options(&self) -> &RevealOptions {
        &self.options
    }

    /// Start a new render pass over `items`
    ///
    /// Tears down every previous observation and clears all flags first.
    pub fn bind(&mut self, items: &[ProjectId]) {
        self.disconnect();
        self.bound = items.iter().cloned().collect();

        for item in items {
            let observed = match self.observer.as_mut() {
                Some(observer) => match observer.observe(item) {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(%item, error = %e, "Visibility unavailable, revealing item");
                        false
                    }
                },
                None => false,
            };
            if observed {
                self.observing.insert(item.clone());
            } else {
                self.revealed.insert(item.clone());
            }
        }
        debug!(
            bound = self.bound.len(),
            observing = self.observing.len(),
            "Reveal tracker bound"
        );
    }

    /// Feed one visibility change; returns whether the item became revealed
    pub fn on_visibility(&mut self, item: &ProjectId, ratio: f64) -> bool {
        if !self.observing.contains(item) || ratio < self.options.threshold {
            return false;
        }
        self.observing.remove(item);
        if let Some(observer) = self.observer.as_mut() {
            observer.unobserve(item);
        }
        self.revealed.insert(item.clone())
    }

    /// Feed a batch of entries; returns the newly revealed items in order
    pub fn apply_entries<I>(&mut self, entries: I) -> Vec<ProjectId>
    where
        I: IntoIterator<Item = VisibilityEntry>,
    {
        entries
            .into_iter()
            .filter(|entry| self.on_visibility(&entry.item, entry.ratio))
            .map(|entry| entry.item)
            .collect()
    }

    pub fn is_revealed(&self, item: &ProjectId) -> bool {
        self.revealed.contains(item)
    }

    pub fn is_bound(&self, item: &ProjectId) -> bool {
        self.bound.contains(item)
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.len()
    }

    pub fn observing_count(&self) -> usize {
        self.observing.len()
    }

    /// Entrance delay for the item rendered at `index`
    pub fn delay_for(&self, index: usize) -> Duration {
        reveal_delay(index, self.options.stagger)
    }

    /// Drop every observation and flag
    pub fn disconnect(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer.disconnect();
        }
        self.bound.clear();
        self.observing.clear();
        self.revealed.clear();
    }
}

impl Drop for RevealTracker {
    fn drop(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer.disconnect();
        }
    }
}

impl std::fmt::Debug for RevealTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevealTracker")
            .field("options", &self.options)
            .field("has_observer", &self.observer.is_some())
            .field("bound", &self.bound.len())
            .field("observing", &self.observing.len())
            .field("revealed", &self.revealed.len())
            .finish()
    }
}

#[derive(Default)]
struct GeometryInner {
    layout: HashMap<ProjectId, Rect>,
    observed: Vec<ProjectId>,
}

/// Observer evaluating item rectangles supplied by the host
///
/// Clones share state: install one clone in a [`RevealTracker`], keep the
/// other to publish layout and produce entries on scroll.
#[derive(Clone, Default)]
pub struct GeometryObserver {
    inner: Arc<Mutex<GeometryInner>>,
}

impl GeometryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record where an item is laid out
    pub fn set_layout(&self, item: ProjectId, rect: Rect) {
        self.inner.lock().layout.insert(item, rect);
    }

    /// Items currently observed, in observation order
    pub fn observed(&self) -> Vec<ProjectId> {
        self.inner.lock().observed.clone()
    }

    /// Visibility of every observed, laid-out item for this viewport
    pub fn entries(&self, viewport: &Rect, root_margin: f64) -> Vec<VisibilityEntry> {
        let inner = self.inner.lock();
        inner
            .observed
            .iter()
            .filter_map(|item| {
                let rect = inner.layout.get(item)?;
                Some(VisibilityEntry {
                    item: item.clone(),
                    ratio: intersection_ratio(rect, viewport, root_margin),
                })
            })
            .collect()
    }
}

impl VisibilityObserver for GeometryObserver {
    fn observe(&mut self, item: &ProjectId) -> FolioResult<()> {
        let mut inner = self.inner.lock();
        if !inner.observed.contains(item) {
            inner.observed.push(item.clone());
        }
        Ok(())
    }

    fn unobserve(&mut self, item: &ProjectId) {
        self.inner.lock().observed.retain(|i| i != item);
    }

    fn disconnect(&mut self) {
        self.inner.lock().observed.clear();
    }
}
