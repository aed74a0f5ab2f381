//! Concurrent batch processor
//!
//! Runs a [`ProcessItem`] over a fetched batch with a bounded number of
//! workers. Workers share one FIFO queue of index-tagged items and write
//! accepted items into a fixed slot array, so the output keeps fetch order
//! no matter which worker finishes first.

use crate::context::Context;
use crate::error::Result;
use crate::pagination::{BatchProcess, ProcessItem};
use crate::types::Item;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, trace};

type Queue<K, V> = Arc<Mutex<VecDeque<(usize, Item<K, V>)>>>;
type Slots<K, V> = Arc<Mutex<Vec<Option<Item<K, V>>>>>;

/// How a worker stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// Stored one accepted item
    Accepted,
    /// Found the queue empty
    Drained,
    /// Saw the context cancelled or expired
    Cancelled,
}

/// Per-call worker outcome counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessStats {
    /// Workers spawned
    pub workers: usize,
    /// Workers that stopped after accepting an item
    pub accepted: usize,
    /// Workers that ran out of queued items
    pub drained: usize,
    /// Workers stopped by cancellation
    pub cancelled: usize,
}

impl ProcessStats {
    fn record(&mut self, exit: WorkerExit) {
        match exit {
            WorkerExit::Accepted => self.accepted += 1,
            WorkerExit::Drained => self.drained += 1,
            WorkerExit::Cancelled => self.cancelled += 1,
        }
    }
}

/// A [`BatchProcess`] that processes items in parallel.
///
/// One worker is started per needed item. Each worker keeps pulling items
/// until one is accepted, then exits, so processing stops dispatching new
/// work once enough items have been accepted.
pub struct ConcurrentProcessor<P> {
    process: Arc<P>,
}

impl<P> ConcurrentProcessor<P> {
    /// Wrap a per-item capability
    pub fn new(process: P) -> Self {
        Self {
            process: Arc::new(process),
        }
    }

    /// The wrapped per-item capability
    pub fn inner(&self) -> &P {
        &self.process
    }
}

impl<P> Clone for ConcurrentProcessor<P> {
    fn clone(&self) -> Self {
        Self {
            process: Arc::clone(&self.process),
        }
    }
}

impl<P> fmt::Debug for ConcurrentProcessor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcurrentProcessor").finish_non_exhaustive()
    }
}

impl<P> ConcurrentProcessor<P> {
    /// Process `items`, returning the accepted ones in fetch order along
    /// with how the workers ended.
    ///
    /// Returns once every worker has exited.
    pub async fn run<K, V>(
        &self,
        ctx: &Context,
        items: Vec<Item<K, V>>,
        needed: usize,
    ) -> (Vec<Item<K, V>>, ProcessStats)
    where
        K: Send + 'static,
        V: Send + 'static,
        P: ProcessItem<K, V> + 'static,
    {
        let total = items.len();
        // Workers beyond the queue length would exit without pulling.
        let workers = needed.min(total);
        let mut stats = ProcessStats {
            workers,
            ..ProcessStats::default()
        };
        if workers == 0 {
            return (Vec::new(), stats);
        }

        let queue: Queue<K, V> = Arc::new(Mutex::new(items.into_iter().enumerate().collect()));
        let slots: Slots<K, V> = Arc::new(Mutex::new((0..total).map(|_| None).collect()));

        let mut set = JoinSet::new();
        for worker_id in 0..workers {
            set.spawn(run_worker(
                worker_id,
                ctx.clone(),
                Arc::clone(&queue),
                Arc::clone(&slots),
                Arc::clone(&self.process),
            ));
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(exit) => stats.record(exit),
                Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
                Err(e) => {
                    debug!("Worker aborted: {e}");
                    stats.record(WorkerExit::Cancelled);
                }
            }
        }

        let slots = std::mem::take(&mut *slots.lock().await);
        let accepted: Vec<_> = slots.into_iter().flatten().collect();

        debug!(
            total,
            workers,
            kept = accepted.len(),
            cancelled = stats.cancelled,
            "Concurrent processing finished"
        );

        (accepted, stats)
    }
}

#[async_trait]
impl<K, V, P> BatchProcess<K, V> for ConcurrentProcessor<P>
where
    K: Send + 'static,
    V: Send + 'static,
    P: ProcessItem<K, V> + 'static,
{
    async fn process_batch(
        &self,
        ctx: &Context,
        items: Vec<Item<K, V>>,
        needed: usize,
    ) -> Result<Vec<Item<K, V>>> {
        let (accepted, _stats) = self.run(ctx, items, needed).await;
        Ok(accepted)
    }
}

async fn run_worker<K, V, P>(
    worker_id: usize,
    ctx: Context,
    queue: Queue<K, V>,
    slots: Slots<K, V>,
    process: Arc<P>,
) -> WorkerExit
where
    P: ProcessItem<K, V>,
{
    trace!("Worker {worker_id} started");
    loop {
        if ctx.is_done() {
            trace!("Worker {worker_id} cancelled");
            return WorkerExit::Cancelled;
        }

        let next = queue.lock().await.pop_front();
        let Some((index, item)) = next else {
            trace!("Worker {worker_id} drained");
            return WorkerExit::Drained;
        };

        if let Some(accepted) = process.process(&ctx, item).await {
            slots.lock().await[index] = Some(accepted);
            trace!("Worker {worker_id} accepted item {index}");
            return WorkerExit::Accepted;
        }
    }
}
