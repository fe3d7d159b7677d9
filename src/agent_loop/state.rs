//! Per-run mutable state of the orchestrator.

use std::collections::HashMap;

use serde_json::{Map, Value};

/// In-progress assistant text for the current segment.
#[derive(Debug, Default)]
pub struct TextAccumulator {
    buffer: String,
}

impl TextAccumulator {
    pub fn push(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Take the buffered text, leaving the accumulator empty.
    /// Returns `None` when there is nothing to flush.
    pub fn flush(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }
}

/// Normalized arguments of tool calls that have started but not completed.
#[derive(Debug, Default)]
pub struct PendingToolCalls {
    calls: HashMap<String, Map<String, Value>>,
}

impl PendingToolCalls {
    pub fn register(&mut self, call_id: impl Into<String>, args: Map<String, Value>) {
        self.calls.insert(call_id.into(), args);
    }

    /// Remove and return the arguments of `call_id`; unknown ids yield an
    /// empty mapping.
    pub fn resolve(&mut self, call_id: &str) -> Map<String, Value> {
        match self.calls.remove(call_id) {
            Some(args) => args,
            None => {
                tracing::debug!(call_id, "tool result for unknown call id");
                Map::new()
            }
        }
    }

    pub fn contains(&self, call_id: &str) -> bool {
        self.calls.contains_key(call_id)
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.calls.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}
