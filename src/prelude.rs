//! Convenience re-exports for common use.

pub use crate::agent_loop::{
    AgentRunner, AgentStreamEvent, NoopConsumer, RunConsumer, RunResult, RunStatus,
    ToolCallOutcome,
};
pub use crate::config::AgentConfig;
pub use crate::connector::{Connector, ConnectorOutput, EntityInfo, ToolPolicy};
pub use crate::error::{AgentError, Result};
pub use crate::runtime::AgentRuntime;
pub use crate::tools::{
    connector_tools, ActionKind, AgentTool, AgentToolParameters, DownloadArtifact, Tool,
    ToolArguments, ToolPipeline,
};
pub use crate::types::{ContentPart, ModelMessage, Role};
