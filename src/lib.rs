// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # pagewise
//!
//! Cursor-based pagination over sources whose items may be filtered out
//! after they are fetched.
//!
//! ## Features
//!
//! - **Exact pages**: keeps fetching until the requested length is reached,
//!   the source is exhausted, or the time budget runs out
//! - **Filter-aware cursor**: discarded items are never fetched twice
//! - **Concurrent processing**: items are filtered by a worker pool while the
//!   page keeps fetch order
//! - **Resume tokens**: page positions encode to opaque strings and can be
//!   checkpointed to disk
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagewise::{
//!     ConcurrentProcessor, Context, FetchAndProcess, Item, MemorySource, Paginator,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     let items = (1..=5).map(|k| Item::new(k, format!("Item {k}")));
//!     let keep = |_ctx: Context, item: Item<i32, String>| async move {
//!         (item.value != "Item 1").then_some(item)
//!     };
//!     let source = FetchAndProcess::new(
//!         MemorySource::new(items),
//!         ConcurrentProcessor::new(keep),
//!     );
//!
//!     let mut paginator = Paginator::new(source, 0);
//!     let page = paginator.paginate(&Context::new(), 2).await.unwrap();
//!     assert_eq!(page.keys().copied().collect::<Vec<_>>(), vec![2, 3]);
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │  Paginator::paginate(ctx, length)                  │
//! │  accumulate → truncate → advance cursor → next()   │
//! └──────────────────────────┬─────────────────────────┘
//!                            │ Source::next_batch
//! ┌──────────────────────────┴─────────────────────────┐
//! │  FetchAndProcess                                   │
//! │  Fetch (limit + over-fetch) → BatchProcess         │
//! └──────────────┬─────────────────────────┬───────────┘
//!                │                         │
//!        ┌───────┴───────┐      ┌──────────┴──────────┐
//!        │ MemorySource  │      │ ConcurrentProcessor │
//!        │ any Fetch     │      │ ProcessItem workers │
//!        └───────────────┘      └─────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
#![allow(missing_docs)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Items, pages and batches
pub mod types;

/// Cancellation and deadlines
pub mod context;

/// Paginator configuration
pub mod config;

/// Pagination engine and capability traits
pub mod pagination;

/// Concurrent item processing
pub mod process;

/// Resume token encoding
pub mod cursor;

/// In-memory fetch source
pub mod source;

/// Checkpoint persistence
pub mod state;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::PaginatorConfig;
pub use context::Context;
pub use error::{Error, PaginateError, Result, ResultExt};
pub use pagination::{
    BatchProcess, Direct, Fetch, FetchAndProcess, NextFn, Paginator, ProcessItem, Source,
};
pub use process::ConcurrentProcessor;
pub use source::{MemorySource, Order};
pub use state::CheckpointStore;
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
