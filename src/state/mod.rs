//! Checkpoint module
//!
//! Persists resume tokens so paging can continue across process runs.
//!
//! # Overview
//!
//! The state module provides:
//! - `CheckpointState` - per-stream resume token and progress counters
//! - `CheckpointStore` - in-memory or file-backed persistence with atomic saves

mod manager;
mod types;

pub use manager::CheckpointStore;
pub use types::{CheckpointState, StreamCheckpoint};
