//! Error classification and recovery.

use serde::{Deserialize, Serialize};

/// Broad error category for routing recovery logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The model can self-correct (e.g. output too large).
    ModelRetryable,
    /// A collaborator broke its contract; never retried.
    ContractViolation,
    /// The agent runtime gave up on the run.
    TerminalRun,
    Configuration,
    InvalidInput,
    Io,
    Serialization,
    ToolExecution,
}

/// Suggested recovery action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoverySuggestion {
    /// Select fewer fields, add filters, or lower the limit.
    NarrowQuery,
    FixConnector,
    RestartRun,
    CheckConfiguration,
    CheckArguments,
    CheckToolImplementation,
    ReportBug,
}
