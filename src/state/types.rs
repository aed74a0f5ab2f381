//! Checkpoint types for tracking paging progress
//!
//! These types are serialized to JSON and persisted between runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Checkpoints for every named stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointState {
    /// Per-stream checkpoint
    #[serde(default)]
    pub streams: HashMap<String, StreamCheckpoint>,
}

impl CheckpointState {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get checkpoint for a stream
    pub fn get_stream(&self, stream: &str) -> Option<&StreamCheckpoint> {
        self.streams.get(stream)
    }

    /// Get mutable checkpoint for a stream, creating if needed
    pub fn get_stream_mut(&mut self, stream: &str) -> &mut StreamCheckpoint {
        self.streams.entry(stream.to_string()).or_default()
    }

    /// Get the resume token for a stream
    pub fn get_cursor(&self, stream: &str) -> Option<&str> {
        self.streams.get(stream)?.cursor.as_deref()
    }
}

/// Progress of a single stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamCheckpoint {
    /// Resume token of the last page; `None` once the stream is exhausted
    #[serde(default)]
    pub cursor: Option<String>,

    /// Pages returned so far
    #[serde(default)]
    pub pages: u64,

    /// Items returned so far
    #[serde(default)]
    pub items: u64,

    /// When the checkpoint last changed
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StreamCheckpoint {
    /// Create a new empty checkpoint
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one returned page
    pub fn record_page(&mut self, items: usize, cursor: Option<String>) {
        self.pages += 1;
        self.items += items as u64;
        self.cursor = cursor;
        self.updated_at = Some(Utc::now());
    }

    /// Whether the stream has been paged to its end
    pub fn is_exhausted(&self) -> bool {
        self.pages > 0 && self.cursor.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_default() {
        let state = CheckpointState::new();
        assert!(state.streams.is_empty());
        assert!(state.get_cursor("users").is_none());
    }

    #[test]
    fn test_record_page() {
        let mut checkpoint = StreamCheckpoint::new();
        assert!(!checkpoint.is_exhausted());

        checkpoint.record_page(2, Some("abc".to_string()));
        assert_eq!(checkpoint.pages, 1);
        assert_eq!(checkpoint.items, 2);
        assert!(checkpoint.updated_at.is_some());
        assert!(!checkpoint.is_exhausted());

        checkpoint.record_page(1, None);
        assert_eq!(checkpoint.items, 3);
        assert!(checkpoint.is_exhausted());
    }

    #[test]
    fn test_state_serialization() {
        let mut state = CheckpointState::new();
        state
            .get_stream_mut("users")
            .record_page(5, Some("cursor123".to_string()));

        let json = serde_json::to_string(&state).unwrap();
        let restored: CheckpointState = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.get_cursor("users"), Some("cursor123"));
        assert_eq!(restored, state);
    }

    #[test]
    fn test_missing_fields_default() {
        let restored: CheckpointState =
            serde_json::from_str(r#"{"streams": {"users": {"cursor": "x"}}}"#).unwrap();
        let stream = restored.get_stream("users").unwrap();
        assert_eq!(stream.pages, 0);
        assert!(stream.updated_at.is_none());
    }
}
