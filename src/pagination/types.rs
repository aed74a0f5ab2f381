//! Pagination capability traits
//!
//! Defines the seams between the engine and caller-supplied logic:
//! [`Fetch`] reads raw items, [`ProcessItem`] and [`BatchProcess`] filter
//! them, and [`Source`] is what the engine loop consumes.
//!
//! Closures with the matching shape implement the capability traits
//! directly, so small sources need no wrapper type.

use crate::context::Context;
use crate::error::Result;
use crate::types::{Batch, Fetched, Item, PaginationResult};
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Produces the opaque `next` token of a page
pub type NextFn<K, V> = Arc<dyn Fn(&Context, &PaginationResult<K, V>) -> String + Send + Sync>;

// ============================================================================
// Fetch
// ============================================================================

/// Reads up to `limit` items strictly after `cursor`.
///
/// Implementations must never return items at or before the cursor.
#[async_trait]
pub trait Fetch<K, V>: Send + Sync {
    /// Fetch the next items after `cursor`
    async fn fetch(&self, ctx: &Context, limit: usize, cursor: &K) -> Result<Fetched<K, V>>;
}

#[async_trait]
impl<K, V, F, Fut> Fetch<K, V> for F
where
    K: Clone + Send + Sync + 'static,
    V: Send + 'static,
    F: Fn(Context, usize, K) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Fetched<K, V>>> + Send + 'static,
{
    async fn fetch(&self, ctx: &Context, limit: usize, cursor: &K) -> Result<Fetched<K, V>> {
        (self)(ctx.clone(), limit, cursor.clone()).await
    }
}

// ============================================================================
// Processing
// ============================================================================

/// Accepts (possibly transforming) or discards a single item.
///
/// A discard is an ordinary outcome, not a failure; there is no error
/// channel.
#[async_trait]
pub trait ProcessItem<K, V>: Send + Sync {
    /// `Some` keeps the returned item, `None` drops it
    async fn process(&self, ctx: &Context, item: Item<K, V>) -> Option<Item<K, V>>;
}

#[async_trait]
impl<K, V, F, Fut> ProcessItem<K, V> for F
where
    K: Send + 'static,
    V: Send + 'static,
    F: Fn(Context, Item<K, V>) -> Fut + Send + Sync,
    Fut: Future<Output = Option<Item<K, V>>> + Send + 'static,
{
    async fn process(&self, ctx: &Context, item: Item<K, V>) -> Option<Item<K, V>> {
        (self)(ctx.clone(), item).await
    }
}

/// Filters or transforms a whole fetched batch, knowing how many items the
/// caller still needs.
#[async_trait]
pub trait BatchProcess<K, V>: Send + Sync {
    /// Return the surviving items in fetch order
    async fn process_batch(
        &self,
        ctx: &Context,
        items: Vec<Item<K, V>>,
        needed: usize,
    ) -> Result<Vec<Item<K, V>>>;
}

#[async_trait]
impl<K, V, F, Fut> BatchProcess<K, V> for F
where
    K: Send + 'static,
    V: Send + 'static,
    F: Fn(Context, Vec<Item<K, V>>, usize) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<Item<K, V>>>> + Send + 'static,
{
    async fn process_batch(
        &self,
        ctx: &Context,
        items: Vec<Item<K, V>>,
        needed: usize,
    ) -> Result<Vec<Item<K, V>>> {
        (self)(ctx.clone(), items, needed).await
    }
}

// ============================================================================
// Source
// ============================================================================

/// What the engine loop pulls from: a batch of ready items plus the cursor
/// to continue from.
///
/// An empty batch ends the current `paginate` call.
#[async_trait]
pub trait Source<K, V>: Send + Sync {
    /// Produce up to `needed` items after `cursor`
    async fn next_batch(&self, ctx: &Context, needed: usize, cursor: K) -> Result<Batch<K, V>>;
}

/// Drives the engine from a raw fetch capability, without processing.
///
/// The cursor advances to the last fetched item.
#[derive(Debug, Clone)]
pub struct Direct<F> {
    fetch: F,
}

impl<F> Direct<F> {
    /// Wrap a fetch capability
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }

    /// The wrapped fetch capability
    pub fn inner(&self) -> &F {
        &self.fetch
    }
}

#[async_trait]
impl<K, V, F> Source<K, V> for Direct<F>
where
    K: Clone + Send + Sync + 'static,
    V: Send + 'static,
    F: Fetch<K, V>,
{
    async fn next_batch(&self, ctx: &Context, needed: usize, cursor: K) -> Result<Batch<K, V>> {
        let fetched = self.fetch.fetch(ctx, needed, &cursor).await?;
        let next = fetched
            .items
            .last()
            .map_or(cursor, |item| item.key.clone());
        Ok(Batch::new(fetched.items, fetched.has_next, next))
    }
}
