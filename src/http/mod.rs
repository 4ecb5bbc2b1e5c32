//! HTTP module
//!
//! The transport used by the reference page fetcher: a `reqwest`-backed
//! client with retry, backoff, and token-bucket rate limiting so bursts of
//! scroll-triggered fetches are paced. Retry policy lives here, in the
//! collaborator; the feed engine itself never retries, it just reopens its
//! gate on failure.

mod client;
mod rate_limit;

pub use client::{Backoff, HttpClient, HttpClientConfig, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
