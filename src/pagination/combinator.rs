//! Fetch-and-process combinator
//!
//! Joins a [`Fetch`] and a [`BatchProcess`] into one [`Source`].

use super::types::{BatchProcess, Fetch, Source};
use crate::context::Context;
use crate::error::Result;
use crate::types::Batch;
use async_trait::async_trait;
use tracing::debug;

/// A [`Source`] that fetches raw items and then filters them.
///
/// The cursor moves past every fetched item, filtered or not, so discarded
/// items are never fetched again.
#[derive(Debug, Clone)]
pub struct FetchAndProcess<F, P> {
    fetch: F,
    process: P,
    over_fetch: usize,
}

impl<F, P> FetchAndProcess<F, P> {
    /// Combine a fetch capability with a batch processor
    pub fn new(fetch: F, process: P) -> Self {
        Self {
            fetch,
            process,
            over_fetch: 0,
        }
    }

    /// Request `extra` items beyond what is needed on every fetch
    #[must_use]
    pub fn with_over_fetch(mut self, extra: usize) -> Self {
        self.over_fetch = extra;
        self
    }

    /// Extra items requested per fetch
    pub fn over_fetch(&self) -> usize {
        self.over_fetch
    }

    /// The wrapped fetch capability
    pub fn fetcher(&self) -> &F {
        &self.fetch
    }

    /// The wrapped batch processor
    pub fn processor(&self) -> &P {
        &self.process
    }
}

#[async_trait]
impl<K, V, F, P> Source<K, V> for FetchAndProcess<F, P>
where
    K: Clone + Send + Sync + 'static,
    V: Send + 'static,
    F: Fetch<K, V>,
    P: BatchProcess<K, V>,
{
    async fn next_batch(&self, ctx: &Context, needed: usize, cursor: K) -> Result<Batch<K, V>> {
        let limit = needed.saturating_add(self.over_fetch);
        let fetched = self.fetch.fetch(ctx, limit, &cursor).await?;

        let Some(last) = fetched.items.last() else {
            return Ok(Batch::new(Vec::new(), fetched.has_next, cursor));
        };
        let next = last.key.clone();
        let fetched_count = fetched.items.len();

        let processed = self.process.process_batch(ctx, fetched.items, needed).await?;

        // The source may stay silent about more data when it over-fetched;
        // infer continuation from volume.
        let has_next =
            fetched.has_next || (fetched_count > needed && processed.len() >= needed);

        debug!(
            needed,
            fetched = fetched_count,
            kept = processed.len(),
            has_next,
            "Processed fetched batch"
        );

        Ok(Batch::new(processed, has_next, next))
    }
}
