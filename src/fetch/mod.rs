//! Page fetcher module
//!
//! The seam between the feed engine and whatever actually talks to the
//! catalog. The engine only ever sees the [`PageFetcher`] trait; the
//! shipped implementation is [`HttpPageFetcher`], driven by a YAML feed
//! definition.

mod http;

pub use http::HttpPageFetcher;

use crate::error::Result;
use crate::types::Page;
use async_trait::async_trait;

/// Fetches one page of a cursor-paginated feed.
///
/// `cursor = None` requests the first page; a prior page's `end_cursor`
/// requests the one after it. Exhaustion is signalled by returning
/// `has_more = false` (or omitting `end_cursor`). Implementations may be
/// slow and may fail; the engine absorbs failures and retries on the next
/// trigger.
#[async_trait]
pub trait PageFetcher<T>: Send + Sync {
    /// Fetch the page at `cursor`
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<Page<T>>;
}
