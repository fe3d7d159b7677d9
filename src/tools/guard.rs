//! Output-size guard applied at the tool boundary.

use serde::Serialize;

use crate::error::AgentError;

/// Characters of the oversized payload included in the retry message.
pub const PREVIEW_CHARS: usize = 500;

/// Turns over-budget tool output into a signal the model can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSizeGuard {
    max_chars: Option<usize>,
    retry_channel: bool,
}

impl OutputSizeGuard {
    /// `None` or a non-positive budget disables the guard.
    pub fn new(max_chars: Option<i64>) -> Self {
        Self {
            max_chars: max_chars
                .filter(|max| *max > 0)
                .and_then(|max| usize::try_from(max).ok()),
            retry_channel: true,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    /// Whether the host can route [`AgentError::ModelRetry`] back to the model.
    /// Without it, oversized output fails with [`AgentError::OutputTooLarge`].
    pub fn with_retry_channel(mut self, available: bool) -> Self {
        self.retry_channel = available;
        self
    }

    pub fn max_chars(&self) -> Option<usize> {
        self.max_chars
    }

    pub fn is_enabled(&self) -> bool {
        self.max_chars.is_some()
    }

    /// Pass `result` through, or fail when its serialized form is over budget.
    pub fn check<T: Serialize>(&self, result: T, label: &str) -> Result<T, AgentError> {
        let Some(max_chars) = self.max_chars else {
            return Ok(result);
        };
        let serialized = match serde_json::to_string(&result) {
            Ok(serialized) => serialized,
            Err(err) => {
                tracing::debug!(tool = label, error = %err, "output size guard skipped unserializable result");
                return Ok(result);
            }
        };
        let length = serialized.chars().count();
        if length <= max_chars {
            return Ok(result);
        }

        tracing::warn!(tool = label, length, max_chars, "tool output over size budget");
        let message = oversized_message(label, &serialized, length, max_chars);
        if self.retry_channel {
            Err(AgentError::ModelRetry(message))
        } else {
            Err(AgentError::OutputTooLarge(message))
        }
    }
}

fn oversized_message(label: &str, serialized: &str, length: usize, max_chars: usize) -> String {
    let preview: String = serialized.chars().take(PREVIEW_CHARS).collect();
    format!(
        "Output of '{label}' is too large ({length} characters, limit {max_chars}). \
         Retry with a narrower request: pass select_fields with only the fields you need, \
         add filters to the params, or reduce the limit.\n\
         Preview (first {PREVIEW_CHARS} characters):\n{preview}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn preview_of(message: &str) -> Option<&str> {
        message
            .split_once(" characters):\n")
            .map(|(_, preview)| preview)
    }

    fn payload(chars: usize) -> serde_json::Value {
        // Serialized as `"…"`, so two characters of quoting.
        json!("z".repeat(chars - 2))
    }

    #[test]
    fn oversized_output_raises_retry_with_short_preview() {
        let guard = OutputSizeGuard::new(Some(50_000));
        let err = guard.check(payload(60_000), "execute").unwrap_err();
        let AgentError::ModelRetry(message) = err else {
            panic!("expected a retry signal, got {err:?}");
        };
        assert!(message.contains("60000 characters"));
        assert!(message.contains("select_fields"));
        assert_eq!(preview_of(&message).unwrap().chars().count(), PREVIEW_CHARS);
    }

    #[test]
    fn within_budget_passes_through() {
        let guard = OutputSizeGuard::new(Some(50_000));
        let value = payload(50_000);
        assert_eq!(guard.check(value.clone(), "execute").unwrap(), value);
    }

    #[test]
    fn disabled_by_none_or_non_positive_budget() {
        for budget in [None, Some(0), Some(-10)] {
            let guard = OutputSizeGuard::new(budget);
            assert!(!guard.is_enabled());
            assert!(guard.check(payload(100_000), "execute").is_ok());
        }
    }

    #[test]
    fn degrades_to_hard_failure_without_retry_channel() {
        let guard = OutputSizeGuard::new(Some(10)).with_retry_channel(false);
        let err = guard.check(payload(100), "execute").unwrap_err();
        assert!(matches!(err, AgentError::OutputTooLarge(_)));
        assert!(!err.is_model_retryable());
    }

    #[test]
    fn unserializable_results_are_not_blocked() {
        // Non-string map keys cannot be serialized to JSON.
        let mut map = HashMap::new();
        map.insert((1, 2), "x".repeat(1_000));
        let guard = OutputSizeGuard::new(Some(10));
        assert!(guard.check(map, "execute").is_ok());
    }
}
