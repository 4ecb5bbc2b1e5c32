//! # pagefeed
//!
//! A minimal, Rust-native incremental loading engine for cursor-paginated
//! catalogs. Seed the feed with a first page, wire a visibility sentinel to
//! it, and the controller fetches and merges further pages on demand while
//! keeping the item list duplicate-free and in arrival order, even under
//! overlapping triggers and stale responses.
//!
//! ## Features
//!
//! - **Cursor pagination engine**: tracks `has_more` / cursor state and
//!   decides when a next-page fetch is warranted
//! - **Idempotent merging**: stale or duplicate page deliveries are
//!   neutralized at merge time, never surfaced as errors
//! - **At-most-one-in-flight**: a single eligibility gate guarantees fetches
//!   cannot overlap or arrive out of order
//! - **Pluggable fetchers**: any `PageFetcher` works; an HTTP fetcher driven
//!   by a YAML feed definition ships in the box
//! - **Sentinel binding**: an edge-triggered visibility channel stands in
//!   for the browser's intersection callback
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagefeed::{load_definition, FeedController, HttpPageFetcher, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let definition = load_definition("feeds/products.yaml")?;
//!     let fetcher = HttpPageFetcher::new(definition)?;
//!
//!     // First page is fetched out-of-band and seeds the controller
//!     let first = fetcher.fetch_first_page().await?;
//!     let controller = FeedController::new(fetcher);
//!     controller.seed(first).await;
//!
//!     // Each sentinel event may trigger at most one background fetch
//!     while controller.should_observe_sentinel().await {
//!         controller.on_sentinel_visible().await;
//!     }
//!
//!     println!("loaded {} items", controller.len().await);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     FeedController                        │
//! │  seed(page)   on_sentinel_visible()   snapshot()          │
//! └───────────────────────────┬───────────────────────────────┘
//!                             │
//! ┌──────────────┬────────────┴───────────┬──────────────────┐
//! │  FeedState   │      PageFetcher       │     Sentinel     │
//! ├──────────────┼────────────────────────┼──────────────────┤
//! │ cursor gate  │ HttpPageFetcher        │ mark_visible()   │
//! │ merge/de-dup │ (reqwest + rate limit) │ binding task     │
//! │ seed/replace │ or any custom impl     │ abort teardown   │
//! └──────────────┴────────────────────────┴──────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for pagefeed
pub mod error;

/// Common types: items, pages, shared aliases
pub mod types;

/// Feed definitions loaded from YAML
pub mod config;

/// HTTP client with retry and rate limiting
pub mod http;

/// Page fetcher trait and the HTTP reference implementation
pub mod fetch;

/// The pagination state machine and its controller
pub mod feed;

/// Visibility sentinel channel and binding
pub mod sentinel;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{load_definition, load_definition_from_str, FeedDefinition};
pub use error::{Error, Result};
pub use feed::{FeedController, FeedSnapshot, FeedState, FetchOutcome, FetchStatus, MergeOutcome};
pub use fetch::{HttpPageFetcher, PageFetcher};
pub use sentinel::{Sentinel, SentinelBinding, SentinelEvents};
pub use types::{CatalogItem, FeedItem, Page};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
