//! Feed controller
//!
//! Async orchestration around the state machine: takes the eligibility gate
//! under a lock, awaits the fetcher (the only suspension point), and applies
//! the result. Cheap to clone; all clones share one state.

use super::state::{FeedState, FetchStatus, MergeOutcome};
use crate::error::Result;
use crate::fetch::PageFetcher;
use crate::types::{FeedItem, Page};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// What a next-page trigger ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// A page was fetched and merged
    Merged {
        /// Number of items appended to the list
        appended: usize,
    },
    /// A page was fetched but dropped as a duplicate/stale delivery
    Discarded,
    /// The trigger was ineligible (fetch in flight, exhausted, or no cursor)
    Skipped,
    /// The fetch failed; state is untouched and a later trigger will retry
    Failed,
}

/// Point-in-time copy of the feed for the presentation layer
#[derive(Debug, Clone)]
pub struct FeedSnapshot<T> {
    /// Accumulated items in merge order
    pub items: Vec<T>,
    /// Whether another page may exist
    pub has_more: bool,
    /// Current fetch status
    pub fetch_status: FetchStatus,
}

/// Owns the feed state and decides, fetches, merges, and exposes.
///
/// The at-most-one-in-flight invariant holds because eligibility check and
/// gate flip happen inside a single lock acquisition; since only one fetch
/// can be outstanding, merges apply in the order fetches were initiated.
/// There is no cancellation: a response made stale by a re-seed is
/// neutralized by the merge-time duplicate guard instead.
pub struct FeedController<T: FeedItem, F> {
    /// Shared pagination state
    state: Arc<Mutex<FeedState<T>>>,
    /// The page fetcher collaborator
    fetcher: Arc<F>,
}

impl<T, F> FeedController<T, F>
where
    T: FeedItem + Send,
    F: PageFetcher<T>,
{
    /// Create a controller over an empty feed. Seed it before wiring a
    /// sentinel; an unseeded feed never fetches.
    pub fn new(fetcher: F) -> Self {
        Self {
            state: Arc::new(Mutex::new(FeedState::new())),
            fetcher: Arc::new(fetcher),
        }
    }

    /// Seed (or re-seed) the feed from an initial page, replacing all prior
    /// state. Safe to call while a fetch is in flight: the in-flight result
    /// is later checked against the new cursor bookkeeping.
    pub async fn seed(&self, page: Page<T>) {
        let mut state = self.state.lock().await;
        state.seed(page);
        debug!(
            items = state.len(),
            has_more = state.has_more(),
            cursor = ?state.cursor(),
            "feed seeded"
        );
    }

    /// Fetch and merge the next page if the gate allows it.
    ///
    /// Ineligible triggers return [`FetchOutcome::Skipped`] with no side
    /// effect. On fetch failure the gate reopens, the list and cursor are
    /// untouched, and the error propagates.
    pub async fn request_next_page_if_eligible(&self) -> Result<FetchOutcome> {
        let cursor = {
            let mut state = self.state.lock().await;
            match state.begin_fetch() {
                Some(cursor) => cursor,
                None => return Ok(FetchOutcome::Skipped),
            }
        };

        match self.fetcher.fetch_page(Some(cursor.as_str())).await {
            Ok(page) => {
                let mut state = self.state.lock().await;
                match state.merge(page) {
                    MergeOutcome::Merged { appended } => {
                        debug!(
                            appended,
                            total = state.len(),
                            has_more = state.has_more(),
                            "merged next page"
                        );
                        Ok(FetchOutcome::Merged { appended })
                    }
                    MergeOutcome::Discarded => Ok(FetchOutcome::Discarded),
                }
            }
            Err(e) => {
                self.state.lock().await.fetch_failed();
                Err(e)
            }
        }
    }

    /// Sentinel visibility handler. Safe to call arbitrarily often: while a
    /// fetch is in flight it is a no-op, after exhaustion it is a permanent
    /// no-op, and fetch failures are absorbed here (the sentinel stays
    /// visible, so scrolling naturally retries).
    pub async fn on_sentinel_visible(&self) -> FetchOutcome {
        match self.request_next_page_if_eligible().await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("next-page fetch failed: {e}");
                FetchOutcome::Failed
            }
        }
    }

    /// Number of accumulated items
    pub async fn len(&self) -> usize {
        self.state.lock().await.len()
    }

    /// Check if the feed holds no items
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.is_empty()
    }

    /// Whether another page may exist
    pub async fn has_more(&self) -> bool {
        self.state.lock().await.has_more()
    }

    /// Check if a fetch is in flight
    pub async fn is_fetching(&self) -> bool {
        self.state.lock().await.is_fetching()
    }

    /// Whether the presentation layer should keep a sentinel binding
    /// installed (see [`crate::sentinel::SentinelBinding::install`])
    pub async fn should_observe_sentinel(&self) -> bool {
        self.state.lock().await.should_observe()
    }
}

impl<T, F> FeedController<T, F>
where
    T: FeedItem + Clone + Send,
    F: PageFetcher<T>,
{
    /// A point-in-time copy of the feed for rendering
    pub async fn snapshot(&self) -> FeedSnapshot<T> {
        let state = self.state.lock().await;
        FeedSnapshot {
            items: state.items().to_vec(),
            has_more: state.has_more(),
            fetch_status: state.fetch_status(),
        }
    }
}

impl<T: FeedItem, F> Clone for FeedController<T, F> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            fetcher: Arc::clone(&self.fetcher),
        }
    }
}
