//! Batch processors
//!
//! Implementations of [`BatchProcess`](crate::pagination::BatchProcess)
//! that plug into [`FetchAndProcess`](crate::pagination::FetchAndProcess).
//!
//! # Overview
//!
//! - `ConcurrentProcessor` - bounded worker pool with early stop and
//!   order-preserving collection
//! - `WorkerExit` / `ProcessStats` - how the workers of one call ended

mod concurrent;

pub use concurrent::{ConcurrentProcessor, ProcessStats, WorkerExit};
