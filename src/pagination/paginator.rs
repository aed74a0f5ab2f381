//! Pagination engine
//!
//! [`Paginator`] owns the cursor and runs the accumulation loop: it keeps
//! pulling batches from its [`Source`] until the requested page is full,
//! the source runs dry, or the time budget is spent.

use super::types::{Direct, NextFn, Source};
use crate::config::PaginatorConfig;
use crate::context::Context;
use crate::cursor;
use crate::error::{Error, PaginateError, Result};
use crate::types::PaginationResult;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Cursor-based pagination engine
pub struct Paginator<K, V, S> {
    /// Where batches come from
    source: S,
    /// Key of the last item returned to the caller
    last_key: K,
    /// Construction-time settings
    config: PaginatorConfig,
    /// Optional resume-token producer
    next_fn: Option<NextFn<K, V>>,
    _value: PhantomData<fn() -> V>,
}

impl<K, V, S> Paginator<K, V, S>
where
    K: Clone + Send + Sync + 'static,
    V: Send + 'static,
    S: Source<K, V>,
{
    /// Create a paginator starting after `cursor`
    pub fn new(source: S, cursor: K) -> Self {
        Self {
            source,
            last_key: cursor,
            config: PaginatorConfig::default(),
            next_fn: None,
            _value: PhantomData,
        }
    }

    /// Replace all settings
    #[must_use]
    pub fn with_config(mut self, config: PaginatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the time budget of each `paginate` call
    #[must_use]
    pub fn with_max_process_time(mut self, budget: Duration) -> Self {
        self.config = self.config.with_max_process_time(budget);
        self
    }

    /// Set the page length used by [`next_page`](Self::next_page)
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.config = self.config.with_page_size(page_size);
        self
    }

    /// Produce a `next` token for every page that has more after it
    #[must_use]
    pub fn with_next_fn<F>(mut self, next_fn: F) -> Self
    where
        F: Fn(&Context, &PaginationResult<K, V>) -> String + Send + Sync + 'static,
    {
        self.next_fn = Some(Arc::new(next_fn));
        self
    }

    /// Current settings
    pub fn config(&self) -> &PaginatorConfig {
        &self.config
    }

    /// Key of the last item returned so far
    pub fn last_key(&self) -> &K {
        &self.last_key
    }

    /// Move the cursor, e.g. to restart from the beginning
    pub fn reset(&mut self, cursor: K) {
        self.last_key = cursor;
    }

    /// The source batches are pulled from
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch the next page using the configured page size
    pub async fn next_page(
        &mut self,
        ctx: &Context,
    ) -> std::result::Result<PaginationResult<K, V>, PaginateError<K, V>> {
        let length = self.config.page_size;
        self.paginate(ctx, length).await
    }

    /// Collect up to `length` items after the current cursor.
    ///
    /// On failure the error carries the items gathered so far; the cursor
    /// has been moved to the last of them either way.
    pub async fn paginate(
        &mut self,
        ctx: &Context,
        length: usize,
    ) -> std::result::Result<PaginationResult<K, V>, PaginateError<K, V>> {
        let mut result = PaginationResult::with_capacity(length);
        if length == 0 {
            return Ok(result);
        }

        let ctx = ctx.child_with_timeout(self.config.max_process_time());
        let _guard = ctx.drop_guard();

        let mut cursor = self.last_key.clone();
        let mut has_next = true;
        let mut failure = None;
        let mut round = 0_usize;

        while result.items.len() < length && has_next {
            if ctx.is_done() {
                warn!(
                    requested = length,
                    collected = result.items.len(),
                    "Pagination time budget exhausted"
                );
                failure = Some(Error::ResourceExhausted {
                    requested: length,
                    collected: result.items.len(),
                });
                break;
            }

            round += 1;
            let needed = length - result.items.len();
            let batch = match self.source.next_batch(&ctx, needed, cursor.clone()).await {
                Ok(batch) => batch,
                Err(e) => {
                    debug!(round, error = %e, "Source failed");
                    failure = Some(e);
                    break;
                }
            };

            debug!(
                round,
                needed,
                received = batch.items.len(),
                has_next = batch.has_next,
                "Received batch"
            );

            if batch.items.is_empty() {
                // Processing gave up on an expired context; the data is not exhausted.
                if ctx.is_done() {
                    warn!(
                        requested = length,
                        collected = result.items.len(),
                        "Pagination time budget exhausted during processing"
                    );
                    failure = Some(Error::ResourceExhausted {
                        requested: length,
                        collected: result.items.len(),
                    });
                } else {
                    has_next = false;
                }
                break;
            }
            has_next = batch.has_next;
            cursor = batch.cursor;
            result.items.extend(batch.items);
        }

        if result.items.len() > length {
            debug!(
                collected = result.items.len(),
                requested = length,
                "Truncating overshoot"
            );
            result.items.truncate(length);
            has_next = true;
        }
        result.has_next = has_next;

        if let Some(last) = result.items.last() {
            self.last_key = last.key.clone();
        }

        if result.has_next && !result.items.is_empty() {
            if let Some(next_fn) = &self.next_fn {
                result.next = Some(next_fn(&ctx, &result));
            }
        }

        match failure {
            Some(error) => Err(PaginateError::new(result, error)),
            None => Ok(result),
        }
    }
}

impl<K, V, F> Paginator<K, V, Direct<F>>
where
    K: Clone + Send + Sync + 'static,
    V: Send + 'static,
    Direct<F>: Source<K, V>,
{
    /// Drive the engine from a raw fetch capability
    pub fn from_fetch(fetch: F, cursor: K) -> Self {
        Self::new(Direct::new(fetch), cursor)
    }
}

impl<K, V, S> Paginator<K, V, S>
where
    K: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
    V: Send + 'static,
    S: Source<K, V>,
{
    /// Emit resume tokens that [`resume`](Self::resume) understands
    #[must_use]
    pub fn with_key_encoder(mut self) -> Self {
        self.next_fn = Some(cursor::key_encoder());
        self
    }

    /// Continue after the item a resume token points at.
    ///
    /// The returned paginator already emits resume tokens.
    pub fn resume(source: S, token: &str) -> Result<Self> {
        let key = cursor::decode_key(token)?;
        Ok(Self::new(source, key).with_key_encoder())
    }
}

impl<K: fmt::Debug, V, S> fmt::Debug for Paginator<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginator")
            .field("last_key", &self.last_key)
            .field("config", &self.config)
            .field("next_fn", &self.next_fn.is_some())
            .finish_non_exhaustive()
    }
}
