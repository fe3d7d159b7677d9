//! Connector trait: the data source the agent's tools talk to.

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::AgentError;
use crate::tools::shaping::ActionKind;

/// Streamed binary payload of a download action.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>, AgentError>>;

/// What a connector action produced.
pub enum ConnectorOutput {
    /// Structured JSON result (an envelope or a single record).
    Records(serde_json::Value),
    /// Streamed binary content, consumed chunk by chunk.
    Download(ByteStream),
}

impl std::fmt::Debug for ConnectorOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Records(value) => f.debug_tuple("Records").field(value).finish(),
            Self::Download(_) => f.write_str("Download(..)"),
        }
    }
}

/// Entity metadata advertised by a connector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub actions: Vec<ActionKind>,
}

/// Per-tool documentation and output-size policy supplied by a connector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolPolicy {
    /// Appended to the tool's description.
    pub docs: Option<String>,
    /// Overrides the configured output budget; non-positive disables it.
    pub max_output_chars: Option<i64>,
}

/// Core trait implemented by every data-source connector.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connector name (e.g., "gong", "zendesk-support").
    fn name(&self) -> &str;

    /// Run `action` on `entity`.
    ///
    /// Failures reported by the data source are [`AgentError::Connector`].
    async fn execute(
        &self,
        entity: &str,
        action: ActionKind,
        params: serde_json::Map<String, serde_json::Value>,
    ) -> Result<ConnectorOutput, AgentError>;

    /// Entities this connector exposes.
    async fn list_entities(&self) -> Result<Vec<EntityInfo>, AgentError>;

    /// JSON schema of an entity's records, if known.
    async fn entity_schema(&self, entity: &str) -> Result<Option<serde_json::Value>, AgentError>;

    /// Usage instructions for the agent.
    fn instructions(&self) -> Option<String> {
        None
    }

    /// Policy applied when exposing `tool_name` to the agent.
    fn tool_policy(&self, _tool_name: &str) -> ToolPolicy {
        ToolPolicy::default()
    }
}
