//! Pagination module
//!
//! Engine, combinator and capability traits.
//!
//! # Overview
//!
//! A [`Paginator`] fills pages of a requested length from a [`Source`].
//! Sources are usually built from two caller-supplied capabilities:
//!
//! ```text
//!   Fetch ──┐
//!           ├─► FetchAndProcess ──► Source ──► Paginator::paginate
//!   BatchProcess (e.g. ConcurrentProcessor over a ProcessItem)
//! ```
//!
//! A raw [`Fetch`] can also drive the engine directly through [`Direct`].

mod combinator;
mod paginator;
mod types;

pub use combinator::FetchAndProcess;
pub use paginator::Paginator;
pub use types::{BatchProcess, Direct, Fetch, NextFn, ProcessItem, Source};
