//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::PaginatorConfig;
use crate::context::Context;
use crate::cursor;
use crate::error::{Error, Result, ResultExt};
use crate::pagination::{FetchAndProcess, Paginator, ProcessItem};
use crate::process::ConcurrentProcessor;
use crate::source::MemorySource;
use crate::state::CheckpointStore;
use crate::types::{Item, PaginationResult};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Items read from a source file
type FileItem = Item<i64, Value>;

// ============================================================================
// Discard Filter
// ============================================================================

/// Drops items whose value matches one of the configured strings.
///
/// String values compare by content, anything else by its JSON text.
#[derive(Debug, Clone, Default)]
pub struct DiscardFilter {
    discard: Arc<Vec<String>>,
    delay: Duration,
}

impl DiscardFilter {
    /// Create a filter discarding the given values
    pub fn new(discard: impl IntoIterator<Item = String>) -> Self {
        Self {
            discard: Arc::new(discard.into_iter().collect()),
            delay: Duration::ZERO,
        }
    }

    /// Sleep this long before deciding on each item.
    ///
    /// The sleep always completes; a started item is judged even after the
    /// context is done.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Whether `value` is one of the discarded values
    pub fn matches(&self, value: &Value) -> bool {
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        self.discard.iter().any(|d| *d == text)
    }
}

#[async_trait]
impl ProcessItem<i64, Value> for DiscardFilter {
    async fn process(&self, _ctx: &Context, item: FileItem) -> Option<FileItem> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.matches(&item.value) {
            debug!(key = item.key, "Discarding item");
            None
        } else {
            Some(item)
        }
    }
}

// ============================================================================
// Runner
// ============================================================================

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Page {
                source,
                length,
                pages,
                discard,
                delay_ms,
                stream,
            } => {
                let filter = DiscardFilter::new(discard.iter().cloned())
                    .with_delay(Duration::from_millis(*delay_ms));
                self.page(source, *length, *pages, filter, stream).await
            }
            Commands::Validate => self.validate(),
        }
    }

    /// Load configuration, falling back to defaults
    fn load_config(&self) -> Result<PaginatorConfig> {
        match &self.cli.config {
            Some(path) => PaginatorConfig::from_file(path),
            None => Ok(PaginatorConfig::default()),
        }
    }

    /// Load checkpoints
    fn load_state(&self) -> Result<CheckpointStore> {
        match &self.cli.state {
            Some(path) => CheckpointStore::from_file(path),
            None => Ok(CheckpointStore::in_memory()),
        }
    }

    /// Page through a source file
    async fn page(
        &self,
        path: &Path,
        length: Option<usize>,
        max_pages: Option<usize>,
        filter: DiscardFilter,
        stream: &str,
    ) -> Result<()> {
        let config = self.load_config()?;
        let store = self.load_state()?;

        if store
            .get_stream(stream)
            .await
            .is_some_and(|checkpoint| checkpoint.is_exhausted())
        {
            self.output_message(&json!({
                "type": "LOG",
                "log": {
                    "level": "INFO",
                    "message": format!("Stream '{stream}' is already exhausted")
                }
            }));
            return Ok(());
        }

        let items = load_items(path)?;
        let length = length.unwrap_or(config.page_size);

        info!(
            source = %path.display(),
            items = items.len(),
            length,
            "Paging source"
        );

        let source = FetchAndProcess::new(items, ConcurrentProcessor::new(filter))
            .with_over_fetch(config.over_fetch);

        let mut paginator: Paginator<i64, Value, _> = match store.get_cursor(stream).await {
            Some(token) => {
                info!(stream, "Resuming from checkpoint");
                Paginator::resume(source, &token).context("Invalid checkpoint cursor")?
            }
            None => Paginator::new(source, i64::MIN).with_key_encoder(),
        }
        .with_config(config);

        let interrupt = CancellationToken::new();
        let ctx = Context::from_token(interrupt.clone());
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupt.cancel();
            }
        });

        let mut page = 0_usize;
        while max_pages.map_or(true, |max| page < max) {
            page += 1;
            match paginator.paginate(&ctx, length).await {
                Ok(result) => {
                    self.output_page(stream, page, &result);
                    store
                        .record_page(stream, result.len(), result.next.clone())
                        .await?;
                    if !result.has_next {
                        break;
                    }
                }
                Err(err) => {
                    let exhausted = err.is_resource_exhausted();
                    let (result, error) = err.into_parts();
                    self.output_page(stream, page, &result);

                    if !result.is_empty() {
                        let token = cursor::encode_key(paginator.last_key())?;
                        store.record_page(stream, result.len(), Some(token)).await?;
                    }

                    if !exhausted {
                        return Err(error);
                    }
                    warn!(stream, page, "{error}");
                    if result.is_empty() || ctx.is_cancelled() {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        let path = self
            .cli
            .config
            .as_ref()
            .ok_or_else(|| Error::config("Config file not specified (use --config)"))?;
        let config = PaginatorConfig::from_file(path)?;

        self.output_message(&json!({
            "type": "LOG",
            "log": {
                "level": "INFO",
                "message": format!(
                    "Config '{}' is valid: page_size={}, max_process_time_ms={}, over_fetch={}",
                    path.display(),
                    config.page_size,
                    config.max_process_time_ms,
                    config.over_fetch
                )
            }
        }));

        Ok(())
    }

    /// Output a page message
    fn output_page(&self, stream: &str, page: usize, result: &PaginationResult<i64, Value>) {
        self.output_message(&json!({
            "type": "PAGE",
            "stream": stream,
            "page": page,
            "items": result.items,
            "has_next": result.has_next,
            "next": result.next,
        }));
    }

    /// Output a message in the selected format
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Read a `.json`, `.yaml` or `.yml` list of items
fn load_items(path: &Path) -> Result<MemorySource<i64, Value>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read source file '{}'", path.display()))?;

    let items: Vec<FileItem> = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&content)?,
        Some("yaml" | "yml") => serde_yaml::from_str(&content)?,
        _ => {
            return Err(Error::config(format!(
                "Unsupported source format for '{}' (expected .json, .yaml or .yml)",
                path.display()
            )))
        }
    };

    Ok(MemorySource::new(items))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_discard_filter_matches() {
        let filter = DiscardFilter::new(["Item 1".to_string(), "3".to_string()]);
        assert!(filter.matches(&json!("Item 1")));
        assert!(filter.matches(&json!(3)));
        assert!(!filter.matches(&json!("Item 2")));
        assert!(!filter.matches(&json!({"name": "Item 1"})));
    }

    #[tokio::test]
    async fn test_discard_filter_process() {
        let filter = DiscardFilter::new(["drop".to_string()]);
        let ctx = Context::new();

        assert!(filter
            .process(&ctx, Item::new(1, json!("drop")))
            .await
            .is_none());
        assert_eq!(
            filter.process(&ctx, Item::new(2, json!("keep"))).await,
            Some(Item::new(2, json!("keep")))
        );
    }

    #[tokio::test]
    async fn test_delayed_filter_judges_item_after_cancel() {
        let filter = DiscardFilter::new(["drop".to_string()]).with_delay(Duration::from_millis(5));
        let ctx = Context::new();
        ctx.cancel();

        assert_eq!(
            filter.process(&ctx, Item::new(1, json!("keep"))).await,
            Some(Item::new(1, json!("keep")))
        );
        assert!(filter
            .process(&ctx, Item::new(2, json!("drop")))
            .await
            .is_none());
    }

    #[test]
    fn test_load_items_json_and_yaml() {
        let dir = tempdir().unwrap();

        let json_path = dir.path().join("items.json");
        fs::write(
            &json_path,
            r#"[{"key": 2, "value": "b"}, {"key": 1, "value": "a"}]"#,
        )
        .unwrap();
        let source = load_items(&json_path).unwrap();
        assert_eq!(source.len(), 2);
        assert_eq!(source.items()[0], Item::new(1, json!("a")));

        let yaml_path = dir.path().join("items.yaml");
        fs::write(&yaml_path, "- key: 5\n  value: e\n").unwrap();
        let source = load_items(&yaml_path).unwrap();
        assert_eq!(source.items(), &[Item::new(5, json!("e"))]);
    }

    #[test]
    fn test_load_items_rejects_unknown_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("items.csv");
        fs::write(&path, "key,value").unwrap();

        let err = load_items(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported source format"));
    }

    #[tokio::test]
    async fn test_page_command_records_checkpoint() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("items.json");
        let state = dir.path().join("state.json");
        fs::write(
            &source,
            r#"[
                {"key": 1, "value": "Item 1"},
                {"key": 2, "value": "Item 2"},
                {"key": 3, "value": "Item 3"},
                {"key": 4, "value": "Item 4"}
            ]"#,
        )
        .unwrap();

        let cli = Cli {
            config: None,
            state: Some(state.clone()),
            format: OutputFormat::Json,
            verbose: false,
            command: Commands::Page {
                source,
                length: Some(2),
                pages: Some(1),
                discard: vec!["Item 1".to_string()],
                delay_ms: 0,
                stream: "items".to_string(),
            },
        };
        Runner::new(cli).run().await.unwrap();

        let store = CheckpointStore::from_file(&state).unwrap();
        let token = store.get_cursor("items").await.unwrap();
        assert_eq!(cursor::decode_key::<i64>(&token).unwrap(), 3);
        assert_eq!(store.get_stream("items").await.unwrap().items, 2);
    }

    #[tokio::test]
    async fn test_exhausted_stream_is_not_paged_again() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("items.yaml");
        let state = dir.path().join("state.json");
        fs::write(&source, "- {key: 1, value: a}\n- {key: 2, value: b}\n- {key: 3, value: c}\n")
            .unwrap();

        let cli = || Cli {
            config: None,
            state: Some(state.clone()),
            format: OutputFormat::Json,
            verbose: false,
            command: Commands::Page {
                source: source.clone(),
                length: Some(2),
                pages: None,
                discard: Vec::new(),
                delay_ms: 0,
                stream: "letters".to_string(),
            },
        };

        Runner::new(cli()).run().await.unwrap();
        let stream = CheckpointStore::from_file(&state)
            .unwrap()
            .get_stream("letters")
            .await
            .unwrap();
        assert_eq!(stream.pages, 2);
        assert_eq!(stream.items, 3);
        assert!(stream.is_exhausted());

        Runner::new(cli()).run().await.unwrap();
        let stream = CheckpointStore::from_file(&state)
            .unwrap()
            .get_stream("letters")
            .await
            .unwrap();
        assert_eq!(stream.pages, 2);
        assert_eq!(stream.items, 3);
    }
}
