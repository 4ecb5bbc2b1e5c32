//! Feed definition loading
//!
//! A feed definition is a small YAML document describing how to map a
//! catalog API onto the [`Page`](crate::types::Page) shape: where to GET,
//! which query parameter carries the cursor, and which response paths hold
//! the records, the `has_more` flag, and the end cursor.
//!
//! ```yaml
//! name: products
//! base_url: https://api.example.com
//! endpoint: /catalog/products
//! cursor_param: after
//! page_size_param: first
//! page_size: 24
//! record_path: $.data.products
//! id_field: id
//! has_more_path: $.data.pageInfo.hasNextPage
//! end_cursor_path: $.data.pageInfo.endCursor
//! headers:
//!   X-Shop: demo
//! ```

use crate::error::{Error, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

fn default_id_field() -> String {
    "id".to_string()
}

/// Declarative description of one cursor-paginated feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedDefinition {
    /// Feed name (used in logs and output)
    pub name: String,

    /// Base URL of the catalog API
    pub base_url: String,

    /// Endpoint path for the paginated listing
    pub endpoint: String,

    /// Query parameter carrying the cursor (omitted on the first page)
    pub cursor_param: String,

    /// Optional query parameter for the page size
    #[serde(default)]
    pub page_size_param: Option<String>,

    /// Page size value, sent only when `page_size_param` is set
    #[serde(default)]
    pub page_size: Option<u32>,

    /// Dotted path to the records array in the response body
    pub record_path: String,

    /// Field holding each record's stable id
    #[serde(default = "default_id_field")]
    pub id_field: String,

    /// Dotted path to the `has_more` flag; an absent value means exhausted
    pub has_more_path: String,

    /// Dotted path to the end cursor; absent/null/empty means none
    pub end_cursor_path: String,

    /// Static headers sent with every request
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl FeedDefinition {
    /// Validate the definition, returning the first problem found
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("name", &self.name),
            ("base_url", &self.base_url),
            ("endpoint", &self.endpoint),
            ("cursor_param", &self.cursor_param),
            ("record_path", &self.record_path),
            ("id_field", &self.id_field),
            ("has_more_path", &self.has_more_path),
            ("end_cursor_path", &self.end_cursor_path),
        ] {
            if value.trim().is_empty() {
                return Err(Error::missing_field(field));
            }
        }

        let base = url::Url::parse(&self.base_url)?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "base_url",
                "must be an http:// or https:// URL",
            ));
        }

        if self.page_size_param.is_some() && self.page_size.is_none() {
            return Err(Error::invalid_value(
                "page_size",
                "required when page_size_param is set",
            ));
        }

        Ok(())
    }
}

/// Load a feed definition from a YAML file
pub fn load_definition<P: AsRef<Path>>(path: P) -> Result<FeedDefinition> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read feed definition {}", path.display()))?;
    load_definition_from_str(&content)
}

/// Load a feed definition from a YAML string
pub fn load_definition_from_str(yaml: &str) -> Result<FeedDefinition> {
    let definition: FeedDefinition = serde_yaml::from_str(yaml)?;
    definition.validate()?;
    Ok(definition)
}
