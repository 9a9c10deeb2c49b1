//! Integration tests for the gallery over a file-backed store
//!
//! Drives a [`Gallery`] end to end: export file on disk, live polling,
//! debounced search, category reset and teardown.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use folio_core::{
    CategoryFilter, CollectionQuery, FetchStatus, FolioConfig, Gallery, GalleryEvent,
    GeometryObserver, JsonFileStore, ProjectFetcher, ProjectId, Rect, SortOrder,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::sync::broadcast;
use tokio::time::{sleep, timeout};

// ============================================================================
// Test Utilities
// ============================================================================

const POLL: Duration = Duration::from_millis(20);
const WAIT: Duration = Duration::from_secs(5);

struct TestContext {
    _temp_dir: TempDir,
    export: PathBuf,
}

impl TestContext {
    fn new(projects: Value) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let export = temp_dir.path().join("projects.json");
        write_export(&export, &json!({ "projects": projects }));
        Self {
            _temp_dir: temp_dir,
            export,
        }
    }

    fn gallery(&self, config: &FolioConfig) -> Gallery {
        let _ = tracing_subscriber::fmt::try_init();

        let store = JsonFileStore::new(&self.export).with_poll_interval(POLL);
        let fetcher = ProjectFetcher::new(Arc::new(store), config.collection_query());
        Gallery::new(fetcher, config, None)
    }

    fn rewrite(&self, projects: Value) {
        write_export(&self.export, &json!({ "projects": projects }));
    }
}

/// Replace the export atomically so a poll never sees a half-written file
fn write_export(path: &Path, value: &Value) {
    let staging = path.with_extension("tmp");
    std::fs::write(&staging, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    std::fs::rename(&staging, path).unwrap();
}

fn sample() -> Value {
    json!([
        { "id": "1", "title": "Alpha", "category": "Web", "pills": ["React"], "year": 2023 },
        { "id": "2", "title": "Beta", "category": "Branding", "pills": ["Logo"], "year": 2024 },
        { "id": "3", "title": "Gamma", "category": "Web", "pills": ["Vue"], "year": 2022 },
    ])
}

async fn next_matching(
    events: &mut broadcast::Receiver<GalleryEvent>,
    wanted: impl Fn(&GalleryEvent) -> bool,
) -> GalleryEvent {
    timeout(WAIT, async {
        loop {
            let event = events.recv().await.unwrap();
            if wanted(&event) {
                return event;
            }
        }
    })
    .await
    .expect("event within timeout")
}

fn titles(gallery: &Gallery) -> Vec<String> {
    gallery.visible().into_iter().map(|r| r.title).collect()
}

// ============================================================================
// One-shot Load
// ============================================================================

#[tokio::test]
async fn test_load_from_export_file() {
    let ctx = TestContext::new(sample());
    let gallery = ctx.gallery(&FolioConfig::default());

    assert_eq!(gallery.load().await.unwrap(), 3);
    assert_eq!(titles(&gallery), vec!["Beta", "Alpha", "Gamma"]);

    gallery.set_sort_order(SortOrder::TitleDesc);
    assert_eq!(titles(&gallery), vec!["Gamma", "Beta", "Alpha"]);
    assert_eq!(
        gallery.activate(&ProjectId::from("3")).as_deref(),
        Some("/project/3")
    );
}

#[tokio::test]
async fn test_concurrent_loads_agree() {
    let ctx = TestContext::new(sample());
    let gallery = ctx.gallery(&FolioConfig::default());

    let (a, b) = futures::future::join(gallery.load(), gallery.load()).await;
    assert_eq!(a.unwrap(), 3);
    assert_eq!(b.unwrap(), 3);
    assert_eq!(gallery.status(), FetchStatus::Ready);
    assert_eq!(gallery.visible().len(), 3);
}

#[tokio::test]
async fn test_missing_export_is_connection_failure() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("absent.json"));
    let config = FolioConfig::default();
    let gallery = Gallery::new(
        ProjectFetcher::new(Arc::new(store), config.collection_query()),
        &config,
        None,
    );

    let err = gallery.load().await.unwrap_err();
    assert!(err.is_connection());
    assert!(matches!(gallery.status(), FetchStatus::Failed(_)));
    assert!(gallery.visible().is_empty());
}

#[tokio::test]
async fn test_featured_query_limits_results() {
    let ctx = TestContext::new(sample());
    let config = FolioConfig {
        featured_limit: 2,
        featured_order_by: Some("year".to_string()),
        ..FolioConfig::default()
    };
    let store = JsonFileStore::new(&ctx.export);
    let fetcher = ProjectFetcher::new(Arc::new(store), config.featured_query());

    let records = fetcher.fetch_all().await.unwrap();
    let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "1"]);
}

// ============================================================================
// Live Watching
// ============================================================================

#[tokio::test]
async fn test_watch_redelivers_full_list_on_change() {
    let ctx = TestContext::new(sample());
    let gallery = ctx.gallery(&FolioConfig::default());
    let mut events = gallery.subscribe_events();

    gallery.watch().unwrap();
    next_matching(&mut events, |e| matches!(e, GalleryEvent::Loaded { count: 3 })).await;

    gallery.set_category(CategoryFilter::from_label("Branding"));
    assert_eq!(titles(&gallery), vec!["Beta"]);

    // Branding disappears: the filter falls back to All.
    ctx.rewrite(json!([
        { "id": "1", "title": "Alpha", "category": "Web", "year": 2023 },
        { "id": "4", "title": "Delta", "category": "Web", "year": 2025 },
    ]));
    next_matching(&mut events, |e| matches!(e, GalleryEvent::Loaded { count: 2 })).await;

    assert!(gallery.with_state(|s| s.query().active_category().is_all()));
    assert_eq!(titles(&gallery), vec!["Delta", "Alpha"]);
    gallery.shutdown();
}

#[tokio::test]
async fn test_watch_reports_broken_export_then_recovers() {
    let ctx = TestContext::new(sample());
    let gallery = ctx.gallery(&FolioConfig::default());
    let mut events = gallery.subscribe_events();

    gallery.watch().unwrap();
    next_matching(&mut events, |e| matches!(e, GalleryEvent::Loaded { .. })).await;

    std::fs::write(&ctx.export, "{ not json").unwrap();
    next_matching(&mut events, GalleryEvent::is_failure).await;
    assert!(gallery.visible().is_empty());

    ctx.rewrite(sample());
    next_matching(&mut events, |e| matches!(e, GalleryEvent::Loaded { count: 3 })).await;
    assert_eq!(gallery.visible().len(), 3);
}

#[tokio::test]
async fn test_no_deliveries_after_shutdown() {
    let ctx = TestContext::new(sample());
    let gallery = ctx.gallery(&FolioConfig::default());
    let mut events = gallery.subscribe_events();

    gallery.watch().unwrap();
    next_matching(&mut events, |e| matches!(e, GalleryEvent::Loaded { .. })).await;
    gallery.shutdown();

    ctx.rewrite(json!([]));
    sleep(POLL * 10).await;
    assert_eq!(gallery.visible().len(), 3);
    assert!(!gallery.is_watching());
}

// ============================================================================
// Search and Reveal
// ============================================================================

#[tokio::test]
async fn test_debounced_search_settles_on_last_value() {
    let ctx = TestContext::new(sample());
    let config = FolioConfig {
        debounce_ms: 50,
        ..FolioConfig::default()
    };
    let gallery = ctx.gallery(&config);
    gallery.load().await.unwrap();
    let mut events = gallery.subscribe_events();

    for partial in ["g", "ga", "gam"] {
        gallery.set_search_text(partial);
    }
    let settled = next_matching(&mut events, |e| matches!(e, GalleryEvent::SearchSettled { .. })).await;

    assert_eq!(
        settled,
        GalleryEvent::SearchSettled {
            query: "gam".to_string()
        }
    );
    assert_eq!(titles(&gallery), vec!["Gamma"]);
}

#[tokio::test]
async fn test_reveal_follows_scroll_geometry() {
    let ctx = TestContext::new(sample());
    let config = FolioConfig::default();
    let geometry = GeometryObserver::new();
    let store = JsonFileStore::new(&ctx.export);
    let gallery = Gallery::new(
        ProjectFetcher::new(Arc::new(store), CollectionQuery::default()),
        &config,
        Some(Box::new(geometry.clone())),
    );
    gallery.load().await.unwrap();

    // One card per 400-unit row in a 300-unit viewport.
    for (row, id) in gallery.visible().iter().map(|r| r.id.clone()).enumerate() {
        geometry.set_layout(id, Rect::new(0.0, row as f64 * 400.0, 300.0, 350.0));
    }

    let viewport = Rect::new(0.0, 0.0, 300.0, 300.0);
    for entry in geometry.entries(&viewport, config.root_margin) {
        gallery.on_visibility(&entry.item, entry.ratio);
    }
    assert!(gallery.is_revealed(&ProjectId::from("2")));
    assert!(!gallery.is_revealed(&ProjectId::from("3")));

    let bottom = Rect::new(0.0, 800.0, 300.0, 300.0);
    for entry in geometry.entries(&bottom, config.root_margin) {
        gallery.on_visibility(&entry.item, entry.ratio);
    }
    assert!(gallery.is_revealed(&ProjectId::from("3")));
    assert!(gallery.is_revealed(&ProjectId::from("2")));
}
