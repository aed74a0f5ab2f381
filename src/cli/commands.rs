//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cursor-based pagination over filtered sources
#[derive(Parser, Debug)]
#[command(name = "pagewise")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Paginator configuration file (JSON or YAML)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Checkpoint file (JSON) holding resume tokens
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Page through a file of `{key, value}` items
    Page {
        /// Item file (JSON or YAML list)
        #[arg(long)]
        source: PathBuf,

        /// Items per page (defaults to the configured page size)
        #[arg(short, long)]
        length: Option<usize>,

        /// Stop after this many pages
        #[arg(long)]
        pages: Option<usize>,

        /// Discard items whose value equals this (repeatable)
        #[arg(long)]
        discard: Vec<String>,

        /// Simulated processing time per item, in milliseconds
        #[arg(long, default_value = "0")]
        delay_ms: u64,

        /// Checkpoint stream name
        #[arg(long, default_value = "default")]
        stream: String,
    },

    /// Validate a paginator configuration file
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_command() {
        let cli = Cli::parse_from([
            "pagewise",
            "page",
            "--source",
            "items.json",
            "--length",
            "3",
            "--discard",
            "a",
            "--discard",
            "b",
            "--format",
            "pretty",
        ]);

        assert_eq!(cli.format, OutputFormat::Pretty);
        match cli.command {
            Commands::Page {
                source,
                length,
                pages,
                discard,
                delay_ms,
                stream,
            } => {
                assert_eq!(source, PathBuf::from("items.json"));
                assert_eq!(length, Some(3));
                assert_eq!(pages, None);
                assert_eq!(discard, vec!["a".to_string(), "b".to_string()]);
                assert_eq!(delay_ms, 0);
                assert_eq!(stream, "default");
            }
            Commands::Validate => panic!("expected page command"),
        }
    }

    #[test]
    fn test_parse_validate_with_global_config() {
        let cli = Cli::parse_from(["pagewise", "validate", "--config", "pager.yaml"]);
        assert!(matches!(cli.command, Commands::Validate));
        assert_eq!(cli.config, Some(PathBuf::from("pager.yaml")));
        assert!(!cli.verbose);
    }
}
