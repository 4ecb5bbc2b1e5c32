//! The pagination state machine
//!
//! Pure state with no I/O: seeding, the fetch eligibility gate, and the
//! merge rules that keep the accumulated list duplicate-free and
//! order-preserving. All async orchestration lives in the controller.

use crate::types::{FeedItem, Page};
use std::collections::HashSet;
use tracing::trace;

/// Whether a next-page fetch is currently outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    /// No fetch in flight; the gate is open
    #[default]
    Idle,
    /// A fetch is in flight; further triggers are no-ops
    Fetching,
}

/// Result of applying an arrived page to the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The page was merged; `appended` counts items actually added
    /// (items whose id was already present are skipped)
    Merged {
        /// Number of items appended to the list
        appended: usize,
    },
    /// The page was a duplicate or stale delivery and was dropped whole
    Discarded,
}

impl MergeOutcome {
    /// Check if the page was merged
    pub fn is_merged(&self) -> bool {
        matches!(self, Self::Merged { .. })
    }

    /// Check if the page was discarded
    pub fn is_discarded(&self) -> bool {
        matches!(self, Self::Discarded)
    }
}

/// Accumulated feed state for one catalog view.
///
/// Invariants, maintained by every mutation:
/// - `items` never holds two entries with the same id
/// - `cursor == last_merged_cursor` immediately after a successful merge
/// - a fetch begins only when idle, `has_more`, and a cursor is present
/// - a page whose `end_cursor` equals `last_merged_cursor` merges as a no-op
#[derive(Debug)]
pub struct FeedState<T: FeedItem> {
    /// Accumulated items, insertion order significant
    items: Vec<T>,
    /// Ids already present in `items`
    seen: HashSet<T::Id>,
    /// Whether another page may exist
    has_more: bool,
    /// Cursor for the next fetch; the `end_cursor` of the last merged page
    cursor: Option<String>,
    /// Guard against applying the same delivery twice
    last_merged_cursor: Option<String>,
    /// The at-most-one-in-flight gate
    fetch_status: FetchStatus,
}

impl<T: FeedItem> Default for FeedState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FeedItem> FeedState<T> {
    /// Create an empty, unfetchable state. Call [`seed`](Self::seed) with the
    /// initial page before anything else.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            seen: HashSet::new(),
            has_more: false,
            cursor: None,
            last_merged_cursor: None,
            fetch_status: FetchStatus::Idle,
        }
    }

    /// Replace the entire state with a fresh initial page.
    ///
    /// Nothing from a previous seed survives, so re-seeding (navigation,
    /// revalidation) is idempotent: `seed(p1); seed(p2)` equals `seed(p2)`.
    pub fn seed(&mut self, page: Page<T>) {
        self.items.clear();
        self.seen.clear();
        for item in page.items {
            if self.seen.insert(item.id()) {
                self.items.push(item);
            }
        }
        self.has_more = page.has_more;
        self.cursor.clone_from(&page.end_cursor);
        self.last_merged_cursor = page.end_cursor;
        self.fetch_status = FetchStatus::Idle;
    }

    /// The eligibility gate: if idle with more data and a cursor, flip to
    /// `Fetching` and hand back the cursor to fetch with. Otherwise `None`
    /// with no side effect.
    ///
    /// Check and flip happen in one call so a caller holding the state
    /// exclusively gets an atomic gate.
    pub fn begin_fetch(&mut self) -> Option<String> {
        if self.fetch_status == FetchStatus::Fetching || !self.has_more {
            return None;
        }
        let cursor = self.cursor.clone()?;
        self.fetch_status = FetchStatus::Fetching;
        Some(cursor)
    }

    /// Apply a fetched page.
    ///
    /// A page whose `end_cursor` equals the last merged cursor is a
    /// duplicate or stale delivery and is dropped whole; this is an expected
    /// consequence of overlapping triggers, not a fault. Otherwise items are
    /// appended in order, skipping ids already present, and the cursor
    /// bookkeeping advances. Either way the fetch gate reopens.
    pub fn merge(&mut self, page: Page<T>) -> MergeOutcome {
        self.fetch_status = FetchStatus::Idle;

        if page.end_cursor == self.last_merged_cursor {
            trace!(
                cursor = ?page.end_cursor,
                "discarding duplicate page delivery"
            );
            return MergeOutcome::Discarded;
        }

        let mut appended = 0;
        for item in page.items {
            if self.seen.insert(item.id()) {
                self.items.push(item);
                appended += 1;
            }
        }
        self.has_more = page.has_more;
        self.cursor.clone_from(&page.end_cursor);
        self.last_merged_cursor = page.end_cursor;

        MergeOutcome::Merged { appended }
    }

    /// Record a failed fetch: the gate reopens, nothing else changes, so a
    /// later trigger naturally retries from the same cursor.
    pub fn fetch_failed(&mut self) {
        self.fetch_status = FetchStatus::Idle;
    }

    /// The accumulated items in merge order
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Number of accumulated items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the feed holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether another page may exist
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Cursor for the next fetch, if any
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Current fetch status
    pub fn fetch_status(&self) -> FetchStatus {
        self.fetch_status
    }

    /// Check if a fetch is in flight
    pub fn is_fetching(&self) -> bool {
        self.fetch_status == FetchStatus::Fetching
    }

    /// Whether a visibility sentinel should be observed at all: once the
    /// feed is exhausted (or never had a cursor) no binding is warranted,
    /// since no trigger could ever pass the gate again.
    pub fn should_observe(&self) -> bool {
        self.has_more && self.cursor.is_some()
    }
}
