//! HTTP page fetcher
//!
//! Reference [`PageFetcher`] over the crate's HTTP client, driven by a
//! [`FeedDefinition`]: it builds the query (cursor parameter only when a
//! cursor is present), GETs the endpoint, and decodes the JSON body into a
//! [`Page`] using dotted-path extraction.

use super::PageFetcher;
use crate::config::FeedDefinition;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::types::{CatalogItem, JsonValue, Page};
use async_trait::async_trait;

/// Fetches pages of a cursor-paginated catalog API
#[derive(Debug)]
pub struct HttpPageFetcher {
    client: HttpClient,
    definition: FeedDefinition,
}

impl HttpPageFetcher {
    /// Create a fetcher with a default client pointed at the definition's
    /// base URL
    pub fn new(definition: FeedDefinition) -> Result<Self> {
        definition.validate()?;
        let client = HttpClient::with_config(
            HttpClientConfig::builder()
                .base_url(definition.base_url.clone())
                .build(),
        )?;
        Ok(Self { client, definition })
    }

    /// Create a fetcher with a custom client (timeouts, retries, rate
    /// limits). Relative endpoint paths resolve against the client's base
    /// URL.
    pub fn with_client(definition: FeedDefinition, client: HttpClient) -> Result<Self> {
        definition.validate()?;
        Ok(Self { client, definition })
    }

    /// The definition this fetcher was built from
    pub fn definition(&self) -> &FeedDefinition {
        &self.definition
    }

    /// Fetch the cursor-less first page, used to seed a controller
    pub async fn fetch_first_page(&self) -> Result<Page<CatalogItem>> {
        self.fetch_page(None).await
    }

    /// Map a response body onto the page shape. A missing records array or
    /// a record without its id field fails the whole page; nothing is
    /// partially decoded.
    fn decode_page(&self, body: &JsonValue) -> Result<Page<CatalogItem>> {
        let records = json_at(body, &self.definition.record_path)
            .and_then(JsonValue::as_array)
            .ok_or_else(|| {
                Error::malformed_page(format!(
                    "no records array at '{}'",
                    self.definition.record_path
                ))
            })?;

        let mut items = Vec::with_capacity(records.len());
        for record in records {
            let id = record
                .get(&self.definition.id_field)
                .and_then(value_as_string)
                .ok_or_else(|| {
                    Error::malformed_page(format!(
                        "record missing id field '{}'",
                        self.definition.id_field
                    ))
                })?;
            items.push(CatalogItem::new(id, record.clone()));
        }

        // Absent has_more means exhausted; absent/null/empty cursor means none
        let has_more = json_at(body, &self.definition.has_more_path)
            .and_then(JsonValue::as_bool)
            .unwrap_or(false);
        let end_cursor = json_at(body, &self.definition.end_cursor_path)
            .and_then(value_as_string)
            .filter(|cursor| !cursor.is_empty());

        Ok(Page {
            items,
            has_more,
            end_cursor,
        })
    }
}

#[async_trait]
impl PageFetcher<CatalogItem> for HttpPageFetcher {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<Page<CatalogItem>> {
        let mut request = RequestConfig::new();
        if let Some(cursor) = cursor {
            request = request.query(self.definition.cursor_param.clone(), cursor);
        }
        if let (Some(param), Some(size)) =
            (&self.definition.page_size_param, self.definition.page_size)
        {
            request = request.query(param.clone(), size.to_string());
        }
        for (key, value) in &self.definition.headers {
            request = request.header(key.clone(), value.clone());
        }

        let body: JsonValue = self
            .client
            .get_json(&self.definition.endpoint, request)
            .await?;
        self.decode_page(&body)
    }
}

/// Walk a dotted path (optionally `$.`-prefixed) through nested objects
pub(super) fn json_at<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    let mut current = value;
    for part in path.split('.') {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Render a scalar JSON value as a string (ids and cursors may be numeric)
pub(super) fn value_as_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
