//! Common types used throughout pagewise
//!
//! This module contains the data model shared by the engine, the
//! combinator and the processors: the paged [`Item`], the caller-facing
//! [`PaginationResult`], and the two intermediate batch shapes.

use serde::{Deserialize, Serialize};

// ============================================================================
// Item
// ============================================================================

/// A key/value pair; the unit a source is paged over.
///
/// The key identifies the item's position in the source and becomes the
/// cursor once the item is returned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item<K, V> {
    /// Position of the item in the source
    pub key: K,
    /// Payload
    pub value: V,
}

impl<K, V> Item<K, V> {
    /// Create a new item
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    /// Split into key and value
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }

    /// Replace the value, keeping the key
    #[must_use]
    pub fn map_value<U>(self, f: impl FnOnce(V) -> U) -> Item<K, U> {
        Item {
            key: self.key,
            value: f(self.value),
        }
    }
}

impl<K, V> From<(K, V)> for Item<K, V> {
    fn from((key, value): (K, V)) -> Self {
        Self::new(key, value)
    }
}

// ============================================================================
// Pagination Result
// ============================================================================

/// One page returned by a `paginate` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationResult<K, V> {
    /// Items in fetch order, at most the requested length
    pub items: Vec<Item<K, V>>,
    /// More items are known or suspected to exist past `items`
    pub has_next: bool,
    /// Opaque resume token, set only when a next function is configured
    /// and `has_next` is true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl<K, V> PaginationResult<K, V> {
    /// An empty page with room for `capacity` items
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            has_next: false,
            next: None,
        }
    }

    /// Number of items in the page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the page holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Key of the last item, the position to resume after
    pub fn last_key(&self) -> Option<&K> {
        self.items.last().map(|item| &item.key)
    }

    /// Iterate over the keys in page order
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.items.iter().map(|item| &item.key)
    }
}

impl<K, V> Default for PaginationResult<K, V> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

// ============================================================================
// Batches
// ============================================================================

/// Raw output of a fetch capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched<K, V> {
    /// Items strictly after the requested cursor, in source order
    pub items: Vec<Item<K, V>>,
    /// The source knows of more items past this batch
    pub has_next: bool,
}

impl<K, V> Fetched<K, V> {
    /// Create a fetched batch
    pub fn new(items: Vec<Item<K, V>>, has_next: bool) -> Self {
        Self { items, has_next }
    }

    /// Nothing was found after the cursor
    pub fn empty() -> Self {
        Self::new(Vec::new(), false)
    }
}

/// Output of a [`Source`](crate::pagination::Source): processed items plus
/// the cursor to continue from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch<K, V> {
    /// Items that survived processing, in fetch order
    pub items: Vec<Item<K, V>>,
    /// More items are known or suspected to exist
    pub has_next: bool,
    /// Cursor for the next call; unchanged when nothing was fetched
    pub cursor: K,
}

impl<K, V> Batch<K, V> {
    /// Create a batch
    pub fn new(items: Vec<Item<K, V>>, has_next: bool, cursor: K) -> Self {
        Self {
            items,
            has_next,
            cursor,
        }
    }
}
