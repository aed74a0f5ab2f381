//! CLI module
//!
//! Command-line interface for paging through item files.
//!
//! # Commands
//!
//! - `page` - Page through an item file, discarding matching values
//! - `validate` - Check a paginator configuration file

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{DiscardFilter, Runner};
