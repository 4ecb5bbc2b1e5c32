//! Tests for the feed engine

use super::*;
use crate::error::{Error, Result};
use crate::fetch::PageFetcher;
use crate::types::{CatalogItem, Page};
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use test_case::test_case;

fn item(id: &str) -> CatalogItem {
    CatalogItem::new(id, json!({ "id": id }))
}

fn ids(state: &FeedState<CatalogItem>) -> Vec<String> {
    state.items().iter().map(|i| i.id.clone()).collect()
}

// ============================================================================
// Test fetchers
// ============================================================================

enum Scripted {
    Page(Page<CatalogItem>),
    Fail,
}

/// Replays scripted responses per cursor; counts invocations.
#[derive(Clone)]
struct ScriptedFetcher {
    inner: Arc<ScriptedInner>,
}

struct ScriptedInner {
    by_cursor: std::sync::Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    fn new() -> Self {
        Self {
            inner: Arc::new(ScriptedInner {
                by_cursor: std::sync::Mutex::new(HashMap::new()),
                calls: AtomicUsize::new(0),
            }),
        }
    }

    fn on(self, cursor: &str, page: Page<CatalogItem>) -> Self {
        self.push(cursor, Scripted::Page(page));
        self
    }

    fn fail_once(self, cursor: &str) -> Self {
        self.push(cursor, Scripted::Fail);
        self
    }

    fn push(&self, cursor: &str, entry: Scripted) {
        self.inner
            .by_cursor
            .lock()
            .unwrap()
            .entry(cursor.to_string())
            .or_default()
            .push_back(entry);
    }

    fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher<CatalogItem> for ScriptedFetcher {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<Page<CatalogItem>> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        let key = cursor.unwrap_or_default().to_string();
        let next = self
            .inner
            .by_cursor
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);
        match next {
            Some(Scripted::Page(page)) => Ok(page),
            Some(Scripted::Fail) => Err(Error::fetch_failed("scripted failure")),
            None => Err(Error::fetch_failed(format!(
                "no scripted page for cursor {key:?}"
            ))),
        }
    }
}

/// Blocks every fetch until a permit is released, so tests can observe the
/// in-flight window.
#[derive(Clone)]
struct GatedFetcher {
    inner: Arc<GatedInner>,
}

struct GatedInner {
    calls: AtomicUsize,
    release: tokio::sync::Semaphore,
    page: Page<CatalogItem>,
}

impl GatedFetcher {
    fn new(page: Page<CatalogItem>) -> Self {
        Self {
            inner: Arc::new(GatedInner {
                calls: AtomicUsize::new(0),
                release: tokio::sync::Semaphore::new(0),
                page,
            }),
        }
    }

    fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    fn release_one(&self) {
        self.inner.release.add_permits(1);
    }

    async fn wait_for_call(&self) {
        while self.calls() == 0 {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl PageFetcher<CatalogItem> for GatedFetcher {
    async fn fetch_page(&self, _cursor: Option<&str>) -> Result<Page<CatalogItem>> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        let permit = self.inner.release.acquire().await.expect("semaphore open");
        permit.forget();
        Ok(self.inner.page.clone())
    }
}

// ============================================================================
// FeedState: seeding
// ============================================================================

#[test]
fn test_seed_populates_state() {
    let mut state = FeedState::new();
    state.seed(Page::new(vec![item("a"), item("b")], true, Some("c1")));

    assert_eq!(ids(&state), vec!["a", "b"]);
    assert!(state.has_more());
    assert_eq!(state.cursor(), Some("c1"));
    assert_eq!(state.fetch_status(), FetchStatus::Idle);
    assert!(state.should_observe());
}

#[test]
fn test_reseed_is_idempotent() {
    let p1 = Page::new(vec![item("a"), item("b")], true, Some("c1"));
    let p2 = Page::new(vec![item("x")], true, Some("c9"));

    let mut twice = FeedState::new();
    twice.seed(p1);
    twice.seed(p2.clone());

    let mut once = FeedState::new();
    once.seed(p2);

    assert_eq!(ids(&twice), ids(&once));
    assert_eq!(twice.has_more(), once.has_more());
    assert_eq!(twice.cursor(), once.cursor());
    assert_eq!(twice.fetch_status(), once.fetch_status());
}

#[test]
fn test_seed_deduplicates_within_page() {
    let mut state = FeedState::new();
    state.seed(Page::new(vec![item("a"), item("a"), item("b")], false, None::<&str>));
    assert_eq!(ids(&state), vec!["a", "b"]);
}

#[test]
fn test_reseed_clears_old_ids() {
    let mut state = FeedState::new();
    state.seed(Page::new(vec![item("a")], true, Some("c1")));
    state.seed(Page::new(vec![item("a"), item("b")], false, None::<&str>));

    // "a" from the first seed must not block the second seed's "a"
    assert_eq!(ids(&state), vec!["a", "b"]);
}

// ============================================================================
// FeedState: eligibility gate
// ============================================================================

#[test_case(true,  Some("c1"), true  ; "idle with more and cursor is eligible")]
#[test_case(false, Some("c1"), false ; "exhausted feed is not eligible")]
#[test_case(true,  None,       false ; "missing cursor is not eligible")]
#[test_case(false, None,       false ; "exhausted without cursor is not eligible")]
fn test_begin_fetch_eligibility(has_more: bool, cursor: Option<&str>, eligible: bool) {
    let mut state = FeedState::new();
    state.seed(Page::new(vec![item("a")], has_more, cursor));

    assert_eq!(state.begin_fetch().is_some(), eligible);
    assert_eq!(state.is_fetching(), eligible);
}

#[test]
fn test_begin_fetch_is_exclusive() {
    let mut state = FeedState::new();
    state.seed(Page::new(vec![item("a")], true, Some("c1")));

    assert_eq!(state.begin_fetch(), Some("c1".to_string()));
    // Gate is held; a second trigger is a no-op
    assert_eq!(state.begin_fetch(), None);
}

#[test]
fn test_fetch_failed_reopens_gate_without_mutation() {
    let mut state = FeedState::new();
    state.seed(Page::new(vec![item("a")], true, Some("c1")));

    state.begin_fetch().unwrap();
    state.fetch_failed();

    assert_eq!(ids(&state), vec!["a"]);
    assert!(state.has_more());
    assert_eq!(state.cursor(), Some("c1"));
    assert_eq!(state.fetch_status(), FetchStatus::Idle);
    assert_eq!(state.begin_fetch(), Some("c1".to_string()));
}

// ============================================================================
// FeedState: merging
// ============================================================================

#[test]
fn test_merge_appends_in_order() {
    let mut state = FeedState::new();
    state.seed(Page::new(vec![item("a"), item("b")], true, Some("c1")));

    let outcome = state.merge(Page::new(vec![item("c"), item("d")], true, Some("c2")));

    assert_eq!(outcome, MergeOutcome::Merged { appended: 2 });
    assert_eq!(ids(&state), vec!["a", "b", "c", "d"]);
    assert_eq!(state.cursor(), Some("c2"));
    assert_eq!(state.fetch_status(), FetchStatus::Idle);
}

#[test]
fn test_merge_skips_items_already_present() {
    let mut state = FeedState::new();
    state.seed(Page::new(vec![item("a"), item("b")], true, Some("c1")));

    // Overlapping page: "b" is already in the list
    let outcome = state.merge(Page::new(vec![item("b"), item("c")], true, Some("c2")));

    assert_eq!(outcome, MergeOutcome::Merged { appended: 1 });
    assert_eq!(ids(&state), vec!["a", "b", "c"]);
}

#[test]
fn test_duplicate_delivery_is_discarded() {
    let mut state = FeedState::new();
    state.seed(Page::new(vec![item("a"), item("b")], true, Some("c1")));

    let page = Page::new(vec![item("c"), item("d")], true, Some("c2"));
    assert!(state.merge(page.clone()).is_merged());

    // Same delivery again: dropped whole, not [a,b,c,d,c,d]
    assert_eq!(state.merge(page), MergeOutcome::Discarded);
    assert_eq!(ids(&state), vec!["a", "b", "c", "d"]);
    assert_eq!(state.cursor(), Some("c2"));
    assert_eq!(state.fetch_status(), FetchStatus::Idle);
}

#[test]
fn test_cursor_tracks_last_merged_cursor() {
    let mut state = FeedState::new();
    state.seed(Page::new(vec![item("a")], true, Some("c1")));
    state.merge(Page::new(vec![item("b")], true, Some("c2")));

    // A page carrying the current next-fetch cursor is by definition the
    // last merged one, so replaying it is a no-op
    assert_eq!(state.cursor(), Some("c2"));
    assert!(state
        .merge(Page::new(vec![item("z")], true, Some("c2")))
        .is_discarded());
}

#[test]
fn test_exhaustion_is_permanent() {
    let mut state = FeedState::new();
    state.seed(Page::new(vec![item("a")], true, Some("c1")));
    state.merge(Page::last(vec![item("b")]));

    assert!(!state.has_more());
    assert!(!state.should_observe());
    assert_eq!(state.begin_fetch(), None);
    assert_eq!(state.begin_fetch(), None);
}

#[test]
fn test_unseeded_state_never_fetches() {
    let mut state: FeedState<CatalogItem> = FeedState::new();
    assert!(!state.should_observe());
    assert_eq!(state.begin_fetch(), None);
}

// ============================================================================
// FeedController
// ============================================================================

#[tokio::test]
async fn test_controller_walks_to_exhaustion() {
    let fetcher = ScriptedFetcher::new()
        .on("c1", Page::new(vec![item("c"), item("d")], true, Some("c2")))
        .on("c2", Page::last(vec![item("e")]));
    let controller = FeedController::new(fetcher.clone());

    controller
        .seed(Page::new(vec![item("a"), item("b")], true, Some("c1")))
        .await;

    assert_eq!(
        controller.on_sentinel_visible().await,
        FetchOutcome::Merged { appended: 2 }
    );
    assert_eq!(
        controller.on_sentinel_visible().await,
        FetchOutcome::Merged { appended: 1 }
    );
    // Exhausted: permanent no-op, fetcher never invoked again
    assert_eq!(controller.on_sentinel_visible().await, FetchOutcome::Skipped);
    assert_eq!(controller.on_sentinel_visible().await, FetchOutcome::Skipped);

    assert_eq!(fetcher.calls(), 2);
    assert_eq!(controller.len().await, 5);
    assert!(!controller.has_more().await);
    assert!(!controller.should_observe_sentinel().await);
}

#[tokio::test]
async fn test_controller_failure_then_retry() {
    let fetcher = ScriptedFetcher::new()
        .fail_once("c1")
        .on("c1", Page::last(vec![item("b")]));
    let controller = FeedController::new(fetcher.clone());

    controller
        .seed(Page::new(vec![item("a")], true, Some("c1")))
        .await;

    // First trigger fails; list and cursor untouched, gate reopens
    assert_eq!(controller.on_sentinel_visible().await, FetchOutcome::Failed);
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.items.len(), 1);
    assert!(snapshot.has_more);
    assert_eq!(snapshot.fetch_status, FetchStatus::Idle);

    // Second trigger retries from the same cursor and succeeds
    assert_eq!(
        controller.on_sentinel_visible().await,
        FetchOutcome::Merged { appended: 1 }
    );
    let snapshot = controller.snapshot().await;
    assert_eq!(
        snapshot.items.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(),
        vec!["a", "b"]
    );
    assert!(!snapshot.has_more);
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn test_controller_gates_overlapping_triggers() {
    let fetcher = GatedFetcher::new(Page::last(vec![item("b")]));
    let controller = FeedController::new(fetcher.clone());

    controller
        .seed(Page::new(vec![item("a")], true, Some("c1")))
        .await;

    let background = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.on_sentinel_visible().await })
    };
    fetcher.wait_for_call().await;

    // Second trigger while the first fetch is outstanding: no-op
    assert_eq!(controller.on_sentinel_visible().await, FetchOutcome::Skipped);
    assert_eq!(fetcher.calls(), 1);

    fetcher.release_one();
    assert_eq!(
        background.await.unwrap(),
        FetchOutcome::Merged { appended: 1 }
    );
    assert_eq!(fetcher.calls(), 1);
    assert_eq!(controller.len().await, 2);
}

#[tokio::test]
async fn test_reseed_during_flight_neutralizes_stale_response() {
    // The in-flight fetch will resolve with end_cursor "c2"
    let fetcher = GatedFetcher::new(Page::new(vec![item("stale")], true, Some("c2")));
    let controller = FeedController::new(fetcher.clone());

    controller
        .seed(Page::new(vec![item("a")], true, Some("c1")))
        .await;

    let background = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.on_sentinel_visible().await })
    };
    fetcher.wait_for_call().await;

    // Caller reloads the first page while the fetch is in flight; the fresh
    // state already sits at cursor "c2"
    controller
        .seed(Page::new(vec![item("x"), item("y")], true, Some("c2")))
        .await;

    fetcher.release_one();
    assert_eq!(background.await.unwrap(), FetchOutcome::Discarded);

    let snapshot = controller.snapshot().await;
    assert_eq!(
        snapshot.items.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(),
        vec!["x", "y"]
    );
    assert!(snapshot.has_more);
}

#[tokio::test]
async fn test_controller_clones_share_state() {
    let fetcher = ScriptedFetcher::new().on("c1", Page::last(vec![item("b")]));
    let controller = FeedController::new(fetcher);
    let clone = controller.clone();

    controller
        .seed(Page::new(vec![item("a")], true, Some("c1")))
        .await;
    clone.on_sentinel_visible().await;

    assert_eq!(controller.len().await, 2);
    assert_eq!(clone.len().await, 2);
}
