//! In-memory source
//!
//! A [`Fetch`] over an owned list of items kept sorted by key. Useful for
//! tests, demos and small reference data sets.

use crate::context::Context;
use crate::error::Result;
use crate::pagination::Fetch;
use crate::types::{Fetched, Item};
use async_trait::async_trait;
use std::sync::Arc;

/// Direction keys advance in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Smallest key first; fetches return keys greater than the cursor
    #[default]
    Ascending,
    /// Largest key first; fetches return keys less than the cursor
    Descending,
}

/// Items held in memory, sorted by key in the chosen [`Order`]
#[derive(Debug, Clone)]
pub struct MemorySource<K, V> {
    items: Arc<Vec<Item<K, V>>>,
    order: Order,
}

impl<K: Ord, V> MemorySource<K, V> {
    /// A source paged in ascending key order
    pub fn new(items: impl IntoIterator<Item = Item<K, V>>) -> Self {
        Self::with_order(items, Order::Ascending)
    }

    /// A source paged in descending key order (newest first for time keys)
    pub fn descending(items: impl IntoIterator<Item = Item<K, V>>) -> Self {
        Self::with_order(items, Order::Descending)
    }

    /// A source paged in the given order
    pub fn with_order(items: impl IntoIterator<Item = Item<K, V>>, order: Order) -> Self {
        let mut items: Vec<_> = items.into_iter().collect();
        match order {
            Order::Ascending => items.sort_by(|a, b| a.key.cmp(&b.key)),
            Order::Descending => items.sort_by(|a, b| b.key.cmp(&a.key)),
        }
        Self {
            items: Arc::new(items),
            order,
        }
    }

    /// Index of the first item strictly after `cursor`
    fn start_after(&self, cursor: &K) -> usize {
        match self.order {
            Order::Ascending => self.items.partition_point(|item| item.key <= *cursor),
            Order::Descending => self.items.partition_point(|item| item.key >= *cursor),
        }
    }
}

impl<K, V> MemorySource<K, V> {
    /// Number of items held
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the source holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in paging order
    pub fn items(&self) -> &[Item<K, V>] {
        &self.items
    }

    /// Paging order
    pub fn order(&self) -> Order {
        self.order
    }
}

impl<K: Ord, V> FromIterator<Item<K, V>> for MemorySource<K, V> {
    fn from_iter<I: IntoIterator<Item = Item<K, V>>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[async_trait]
impl<K, V> Fetch<K, V> for MemorySource<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn fetch(&self, _ctx: &Context, limit: usize, cursor: &K) -> Result<Fetched<K, V>> {
        let start = self.start_after(cursor);
        let end = start.saturating_add(limit).min(self.items.len());
        let items = self.items[start..end].to_vec();
        Ok(Fetched::new(items, end < self.items.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> MemorySource<u32, &'static str> {
        vec![
            Item::new(3, "c"),
            Item::new(1, "a"),
            Item::new(2, "b"),
            Item::new(4, "d"),
        ]
        .into_iter()
        .collect()
    }

    #[tokio::test]
    async fn test_fetch_after_cursor() {
        let source = source();
        let ctx = Context::new();

        let fetched = source.fetch(&ctx, 2, &0).await.unwrap();
        assert_eq!(fetched.items, vec![Item::new(1, "a"), Item::new(2, "b")]);
        assert!(fetched.has_next);

        let fetched = source.fetch(&ctx, 5, &2).await.unwrap();
        assert_eq!(fetched.items, vec![Item::new(3, "c"), Item::new(4, "d")]);
        assert!(!fetched.has_next);

        let fetched = source.fetch(&ctx, 5, &4).await.unwrap();
        assert!(fetched.items.is_empty());
        assert!(!fetched.has_next);
    }

    #[tokio::test]
    async fn test_fetch_descending() {
        let source = MemorySource::descending(source().items().to_vec());
        assert_eq!(source.order(), Order::Descending);

        let fetched = source.fetch(&Context::new(), 2, &4).await.unwrap();
        assert_eq!(fetched.items, vec![Item::new(3, "c"), Item::new(2, "b")]);
        assert!(fetched.has_next);
    }

    #[tokio::test]
    async fn test_fetch_zero_limit() {
        let fetched = source().fetch(&Context::new(), 0, &0).await.unwrap();
        assert!(fetched.items.is_empty());
        assert!(fetched.has_next);
    }
}
