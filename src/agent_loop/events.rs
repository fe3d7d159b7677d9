//! Event stream types produced by an agent runtime during one run.

use serde::{Deserialize, Serialize};

use crate::types::ModelMessage;

/// How a tool call finished, as reported by the agent runtime.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolCallOutcome {
    /// The tool returned a value.
    Return { content: serde_json::Value },
    /// The runtime is asking the model to retry the call.
    RetryPrompt { content: serde_json::Value },
}

impl ToolCallOutcome {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::RetryPrompt { .. })
    }

    pub fn content(&self) -> &serde_json::Value {
        match self {
            Self::Return { content } | Self::RetryPrompt { content } => content,
        }
    }

    /// Text shown to consumers: strings pass through, anything else is JSON.
    pub fn display(&self) -> String {
        match self.content() {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

/// Events emitted by an agent runtime, in arrival order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStreamEvent {
    /// A new text part began; it may already carry content.
    TextSegmentStart {
        #[serde(default)]
        content: String,
    },
    TextDelta {
        content: String,
    },
    /// Arguments are kept raw; providers disagree on whether they arrive parsed.
    ToolCallInvoked {
        call_id: String,
        tool_name: String,
        args: serde_json::Value,
    },
    ToolCallCompleted {
        call_id: String,
        tool_name: String,
        outcome: ToolCallOutcome,
    },
    /// Full message list for this run, used as the next turn's history.
    RunCompleted {
        messages: Vec<ModelMessage>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_passes_strings_through() {
        let outcome = ToolCallOutcome::Return {
            content: serde_json::json!("plain text"),
        };
        assert_eq!(outcome.display(), "plain text");
        assert!(!outcome.is_error());
    }

    #[test]
    fn display_serializes_structured_content() {
        let outcome = ToolCallOutcome::RetryPrompt {
            content: serde_json::json!({"error": "narrow it"}),
        };
        assert_eq!(outcome.display(), r#"{"error":"narrow it"}"#);
        assert!(outcome.is_error());
    }

    #[test]
    fn events_round_trip_with_type_tag() {
        let event: AgentStreamEvent = serde_json::from_value(serde_json::json!({
            "type": "tool_call_invoked",
            "call_id": "abc",
            "tool_name": "execute",
            "args": "{\"entity\":\"users\"}",
        }))
        .unwrap();
        assert!(matches!(
            event,
            AgentStreamEvent::ToolCallInvoked { ref call_id, .. } if call_id == "abc"
        ));
    }
}
