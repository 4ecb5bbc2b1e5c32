//! HTTP client with retry and rate limiting
//!
//! Covers exactly the surface the page fetcher needs: GET with query
//! parameters and headers, JSON decoding, retries with backoff on
//! transient failures, and an optional rate limiter gating each attempt.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::error::{Error, Result};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Backoff strategy between retry attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backoff {
    /// Same delay every attempt
    Constant,
    /// Delay grows linearly with the attempt number
    Linear,
    /// Delay doubles each attempt
    #[default]
    Exponential,
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL prefixed to relative paths
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of retries for transient failures
    pub max_retries: u32,
    /// Initial backoff delay
    pub initial_backoff: Duration,
    /// Backoff delay ceiling
    pub max_backoff: Duration,
    /// Backoff strategy
    pub backoff: Backoff,
    /// Rate limiter configuration, `None` to disable
    pub rate_limit: Option<RateLimiterConfig>,
    /// Headers sent with every request
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(60),
            backoff: Backoff::Exponential,
            rate_limit: Some(RateLimiterConfig::default()),
            default_headers: HashMap::new(),
            user_agent: format!("pagefeed/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for [`HttpClientConfig`]
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff strategy and bounds
    pub fn backoff(mut self, backoff: Backoff, initial: Duration, max: Duration) -> Self {
        self.config.backoff = backoff;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Set the rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Per-request configuration
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters
    pub query: HashMap<String, String>,
    /// Request headers
    pub headers: HashMap<String, String>,
}

impl RequestConfig {
    /// Create an empty request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(Error::Http)?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Make a GET request
    pub async fn get(&self, url: &str) -> Result<Response> {
        self.get_with_config(url, RequestConfig::default()).await
    }

    /// Make a GET request with per-request config, retrying transient
    /// failures up to the configured limit
    pub async fn get_with_config(&self, url: &str, request: RequestConfig) -> Result<Response> {
        let full_url = self.build_url(url);
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            if attempt > 0 {
                let delay = self.backoff_delay(attempt - 1);
                warn!(
                    attempt,
                    max = self.config.max_retries,
                    ?delay,
                    "retrying GET {full_url}"
                );
                tokio::time::sleep(delay).await;
            }

            let mut req = self.client.get(&full_url);
            for (key, value) in &self.config.default_headers {
                req = req.header(key.as_str(), value.as_str());
            }
            for (key, value) in &request.headers {
                req = req.header(key.as_str(), value.as_str());
            }
            if !request.query.is_empty() {
                req = req.query(&request.query);
            }

            match req.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        debug!("GET {full_url} -> {}", status.as_u16());
                        return Ok(response);
                    }

                    let error = Error::http_status(
                        status.as_u16(),
                        response.text().await.unwrap_or_default(),
                    );
                    if !is_retryable_status(status) {
                        return Err(error);
                    }
                    last_error = Some(error);
                }
                Err(e) => {
                    if e.is_timeout() {
                        last_error = Some(Error::Timeout {
                            timeout_ms: u64::try_from(self.config.timeout.as_millis())
                                .unwrap_or(u64::MAX),
                        });
                    } else if e.is_connect() {
                        last_error = Some(Error::Http(e));
                    } else {
                        return Err(Error::Http(e));
                    }
                }
            }
        }

        Err(last_error.unwrap_or(Error::MaxRetriesExceeded {
            max_retries: self.config.max_retries,
        }))
    }

    /// Make a GET request and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        request: RequestConfig,
    ) -> Result<T> {
        let response = self.get_with_config(url, request).await?;
        response.json().await.map_err(Error::Http)
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Resolve a path against the configured base URL
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        match &self.config.base_url {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            None => path.to_string(),
        }
    }

    /// Delay before the attempt after `attempt` failures
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff {
            Backoff::Constant => self.config.initial_backoff,
            Backoff::Linear => self.config.initial_backoff * (attempt + 1),
            Backoff::Exponential => self.config.initial_backoff * 2u32.saturating_pow(attempt),
        };
        delay.min(self.config.max_backoff)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Check if an HTTP status warrants another attempt
fn is_retryable_status(status: StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 504)
}
