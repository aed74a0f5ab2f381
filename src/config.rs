//! Paginator configuration
//!
//! Configuration can be built in code with the `with_*` setters or loaded
//! from YAML/JSON. Every field has a default, so an empty document is a
//! valid configuration.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default per-call time budget
pub const DEFAULT_MAX_PROCESS_TIME: Duration = Duration::from_secs(5);

/// Default page length used by `next_page`
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Settings applied when a paginator is constructed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatorConfig {
    /// Time budget for one `paginate` call, in milliseconds
    #[serde(default = "default_max_process_time_ms")]
    pub max_process_time_ms: u64,

    /// Page length used when the caller does not pass one
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    /// Extra items requested from the source on every fetch
    #[serde(default)]
    pub over_fetch: usize,
}

fn default_max_process_time_ms() -> u64 {
    DEFAULT_MAX_PROCESS_TIME.as_millis() as u64
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for PaginatorConfig {
    fn default() -> Self {
        Self {
            max_process_time_ms: default_max_process_time_ms(),
            page_size: default_page_size(),
            over_fetch: 0,
        }
    }
}

impl PaginatorConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-call time budget
    #[must_use]
    pub fn with_max_process_time(mut self, budget: Duration) -> Self {
        self.max_process_time_ms = budget.as_millis() as u64;
        self
    }

    /// Set the default page length
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the number of extra items fetched per call
    #[must_use]
    pub fn with_over_fetch(mut self, over_fetch: usize) -> Self {
        self.over_fetch = over_fetch;
        self
    }

    /// Per-call time budget
    pub fn max_process_time(&self) -> Duration {
        Duration::from_millis(self.max_process_time_ms)
    }

    /// Check values that deserialization cannot rule out
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be at least 1"));
        }
        Ok(())
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("yaml" | "yml") => Self::from_yaml_str(&content),
            _ => Err(Error::config(format!(
                "Unsupported config format for '{}' (expected .json, .yaml or .yml)",
                path.display()
            ))),
        }
    }
}
