//! Tests for the sentinel binding

use super::*;
use crate::error::Result;
use crate::types::{CatalogItem, Page};
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn item(id: &str) -> CatalogItem {
    CatalogItem::new(id, json!({ "id": id }))
}

/// Serves `pages` in request order regardless of cursor; counts calls.
#[derive(Clone)]
struct QueueFetcher {
    inner: Arc<QueueInner>,
}

struct QueueInner {
    pages: std::sync::Mutex<Vec<Page<CatalogItem>>>,
    calls: AtomicUsize,
}

impl QueueFetcher {
    fn new(pages: Vec<Page<CatalogItem>>) -> Self {
        let mut pages = pages;
        pages.reverse();
        Self {
            inner: Arc::new(QueueInner {
                pages: std::sync::Mutex::new(pages),
                calls: AtomicUsize::new(0),
            }),
        }
    }

    fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl crate::fetch::PageFetcher<CatalogItem> for QueueFetcher {
    async fn fetch_page(&self, _cursor: Option<&str>) -> Result<Page<CatalogItem>> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        let page = self.inner.pages.lock().unwrap().pop();
        Ok(page.unwrap_or_else(|| Page::last(vec![])))
    }
}

async fn wait_until(mut done: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !done() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

async fn wait_until_exhausted(controller: &FeedController<CatalogItem, QueueFetcher>) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while controller.has_more().await {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .expect("feed not exhausted in time");
}

#[tokio::test]
async fn test_no_binding_for_exhausted_feed() {
    let fetcher = QueueFetcher::new(vec![]);
    let controller = FeedController::new(fetcher.clone());
    controller.seed(Page::last(vec![item("a")])).await;

    let (_sentinel, events) = Sentinel::new();
    assert!(SentinelBinding::install(&controller, events).await.is_none());
    assert_eq!(fetcher.calls(), 0);
}

#[tokio::test]
async fn test_events_drive_fetches_until_exhaustion() {
    let fetcher = QueueFetcher::new(vec![
        Page::new(vec![item("b")], true, Some("c2")),
        Page::last(vec![item("c")]),
    ]);
    let controller = FeedController::new(fetcher.clone());
    controller
        .seed(Page::new(vec![item("a")], true, Some("c1")))
        .await;

    let (sentinel, events) = Sentinel::new();
    let binding = SentinelBinding::install(&controller, events)
        .await
        .expect("feed has more");

    sentinel.mark_visible();
    sentinel.mark_visible();

    wait_until_exhausted(&controller).await;

    assert_eq!(controller.len().await, 3);
    assert_eq!(fetcher.calls(), 2);

    // Forwarding task exits on its own once the feed is exhausted
    wait_until(|| binding.is_finished()).await;

    // Late events after exhaustion are harmless
    sentinel.mark_visible();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(fetcher.calls(), 2);
}

#[tokio::test]
async fn test_teardown_stops_forwarding() {
    let fetcher = QueueFetcher::new(vec![Page::new(vec![item("b")], true, Some("c2"))]);
    let controller = FeedController::new(fetcher.clone());
    controller
        .seed(Page::new(vec![item("a")], true, Some("c1")))
        .await;

    let (sentinel, events) = Sentinel::new();
    let binding = SentinelBinding::install(&controller, events)
        .await
        .expect("feed has more");
    binding.teardown();

    // Events against a torn-down binding never reach the controller
    sentinel.mark_visible();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(fetcher.calls(), 0);
    assert_eq!(controller.len().await, 1);
}
