//! Feed engine module
//!
//! The incremental pagination core: cursor bookkeeping, fetch eligibility,
//! and idempotent page merging.
//!
//! # Overview
//!
//! The feed module provides:
//! - `FeedState` - The pure pagination state machine (no I/O)
//! - `FeedController` - Async orchestration around a `PageFetcher`
//! - `MergeOutcome` / `FetchOutcome` - What happened to a page or a trigger

mod controller;
mod state;

pub use controller::{FeedController, FeedSnapshot, FetchOutcome};
pub use state::{FeedState, FetchStatus, MergeOutcome};

#[cfg(test)]
mod tests;
