//! Core run types for the agent loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique run identifier.
pub type RunId = Uuid;

/// Run lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    Failed,
    Canceled,
}

/// Result of a driven run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub run_id: RunId,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Number of consumer callbacks dispatched.
    pub dispatched: usize,
    pub finished_at: DateTime<Utc>,
}

impl RunResult {
    pub fn completed(run_id: RunId, dispatched: usize) -> Self {
        Self::new(run_id, RunStatus::Completed, None, dispatched)
    }

    pub fn canceled(run_id: RunId, dispatched: usize) -> Self {
        Self::new(run_id, RunStatus::Canceled, None, dispatched)
    }

    pub fn failed(run_id: RunId, error: impl Into<String>, dispatched: usize) -> Self {
        Self::new(run_id, RunStatus::Failed, Some(error.into()), dispatched)
    }

    fn new(run_id: RunId, status: RunStatus, error: Option<String>, dispatched: usize) -> Self {
        Self {
            run_id,
            status,
            error,
            dispatched,
            finished_at: Utc::now(),
        }
    }
}
