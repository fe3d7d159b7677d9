//! Error types for connector-agent.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for all connector-agent operations.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A collection response arrived without its envelope key.
    #[error(
        "Contract violation: '{action}' response is missing envelope key '{missing_key}' (present keys: [{}])",
        present_keys.join(", ")
    )]
    ContractViolation {
        action: String,
        missing_key: String,
        present_keys: Vec<String>,
    },

    #[error("Connector error: {connector} — {message}")]
    Connector { connector: String, message: String },

    /// Fed back to the model so it can reformulate its request.
    #[error("{0}")]
    ModelRetry(String),

    /// Same payload as [`AgentError::ModelRetry`] when the host has no retry channel.
    #[error("Output too large: {0}")]
    OutputTooLarge(String),

    /// The agent runtime's terminal condition for unrecoverable model failures.
    #[error("Unexpected model behavior: {0}")]
    UnexpectedModelBehavior(String),

    #[error("Tool execution error: {tool_name} — {message}")]
    ToolExecution { tool_name: String, message: String },
}

impl AgentError {
    /// Create a connector failure.
    pub fn connector(connector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connector {
            connector: connector.into(),
            message: message.into(),
        }
    }

    /// Create a tool execution failure.
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ModelRetry(_) => ErrorCategory::ModelRetryable,
            Self::ContractViolation { .. } | Self::Connector { .. } => {
                ErrorCategory::ContractViolation
            }
            Self::UnexpectedModelBehavior(_) => ErrorCategory::TerminalRun,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::InvalidArgument(_) => ErrorCategory::InvalidInput,
            Self::Io(_) => ErrorCategory::Io,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::OutputTooLarge(_) | Self::ToolExecution { .. } => ErrorCategory::ToolExecution,
        }
    }

    /// Whether the model can read this error and revise its own request.
    pub fn is_model_retryable(&self) -> bool {
        self.category() == ErrorCategory::ModelRetryable
    }

    /// Whether this error ends a run through the `on_error` callback.
    pub fn is_terminal_run(&self) -> bool {
        self.category() == ErrorCategory::TerminalRun
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            Self::OutputTooLarge(_) => RecoverySuggestion::NarrowQuery,
            _ => match self.category() {
                ErrorCategory::ModelRetryable => RecoverySuggestion::NarrowQuery,
                ErrorCategory::ContractViolation => RecoverySuggestion::FixConnector,
                ErrorCategory::TerminalRun => RecoverySuggestion::RestartRun,
                ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
                ErrorCategory::InvalidInput => RecoverySuggestion::CheckArguments,
                ErrorCategory::ToolExecution => RecoverySuggestion::CheckToolImplementation,
                ErrorCategory::Io | ErrorCategory::Serialization => RecoverySuggestion::ReportBug,
            },
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, AgentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_violation_names_missing_and_present_keys() {
        let err = AgentError::ContractViolation {
            action: "list".into(),
            missing_key: "data".into(),
            present_keys: vec!["meta".into(), "records".into()],
        };
        let message = err.to_string();
        assert!(message.contains("'data'"));
        assert!(message.contains("meta, records"));
        assert_eq!(err.category(), ErrorCategory::ContractViolation);
        assert_eq!(err.recovery_suggestion(), RecoverySuggestion::FixConnector);
    }

    #[test]
    fn retry_signal_is_model_retryable_but_degraded_form_is_not() {
        let retry = AgentError::ModelRetry("too big".into());
        let hard = AgentError::OutputTooLarge("too big".into());
        assert!(retry.is_model_retryable());
        assert!(!hard.is_model_retryable());
        assert_eq!(hard.recovery_suggestion(), RecoverySuggestion::NarrowQuery);
    }

    #[test]
    fn unexpected_model_behavior_is_terminal() {
        let err = AgentError::UnexpectedModelBehavior("bad output".into());
        assert!(err.is_terminal_run());
        assert_eq!(err.recovery_suggestion(), RecoverySuggestion::RestartRun);
    }
}
