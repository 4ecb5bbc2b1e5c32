//! Common types used throughout pagefeed
//!
//! This module contains the item and page shapes shared by the feed engine,
//! the fetchers, and the CLI, plus a few type aliases.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

// ============================================================================
// Feed Item
// ============================================================================

/// An item that can live in a feed.
///
/// The engine only cares about stable identity: merging skips any item whose
/// id is already present, so the same record delivered on two pages appears
/// once. Everything else about the item is opaque.
pub trait FeedItem {
    /// Stable unique identifier type
    type Id: Eq + Hash + Clone + Debug + Send;

    /// The item's identifier
    fn id(&self) -> Self::Id;
}

/// A catalog entry as decoded by the HTTP fetcher: a stable id plus the raw
/// JSON record it was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Stable unique identifier
    pub id: String,
    /// The full record as returned by the API
    pub fields: JsonValue,
}

impl CatalogItem {
    /// Create a new catalog item
    pub fn new(id: impl Into<String>, fields: JsonValue) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

impl FeedItem for CatalogItem {
    type Id = String;

    fn id(&self) -> String {
        self.id.clone()
    }
}

// ============================================================================
// Page
// ============================================================================

/// One fetch's worth of items plus pagination metadata.
///
/// `end_cursor` is `None` when no further pages exist or the source did not
/// provide one; `has_more` signals whether another page may exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items in the order the fetcher returned them
    pub items: Vec<T>,
    /// Whether another page may exist
    pub has_more: bool,
    /// Opaque cursor marking the position after this page
    pub end_cursor: Option<String>,
}

impl<T> Page<T> {
    /// Create a page with more data behind it
    pub fn new(items: Vec<T>, has_more: bool, end_cursor: Option<impl Into<String>>) -> Self {
        Self {
            items,
            has_more,
            end_cursor: end_cursor.map(Into::into),
        }
    }

    /// Create a final page: no further data, no cursor
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            has_more: false,
            end_cursor: None,
        }
    }

    /// Number of items on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the page carries no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_catalog_item_identity() {
        let item = CatalogItem::new("sku-1", json!({"id": "sku-1", "name": "Lamp"}));
        assert_eq!(item.id(), "sku-1");
    }

    #[test]
    fn test_page_constructors() {
        let page = Page::new(vec![1, 2, 3], true, Some("c1"));
        assert_eq!(page.len(), 3);
        assert!(!page.is_empty());
        assert!(page.has_more);
        assert_eq!(page.end_cursor.as_deref(), Some("c1"));

        let last: Page<i32> = Page::last(vec![]);
        assert!(last.is_empty());
        assert!(!last.has_more);
        assert!(last.end_cursor.is_none());
    }

    #[test]
    fn test_page_serialization() {
        let page = Page::new(
            vec![CatalogItem::new("a", json!({"id": "a"}))],
            true,
            Some("c1"),
        );
        let encoded = serde_json::to_string(&page).unwrap();
        let decoded: Page<CatalogItem> = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, page);
    }
}
