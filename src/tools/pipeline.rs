//! Tool invocation pipeline: normalize, execute, shape, guard.
//!
//! Each stage is a public method so it can be exercised on its own;
//! [`ToolPipeline::invoke`] chains all of them for the `execute` tool.

use std::sync::Arc;

use bon::Builder;
use serde_json::{Map, Value};

use super::arguments::ToolArguments;
use super::download::DownloadMaterializer;
use super::guard::OutputSizeGuard;
use super::shaping::{ActionKind, FieldFilter, ResponseShaper};
use crate::config::AgentConfig;
use crate::connector::{Connector, ConnectorOutput};
use crate::error::AgentError;

/// A validated `execute` tool call.
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct ExecuteRequest {
    #[builder(into)]
    pub entity: String,
    pub action: ActionKind,
    #[builder(default)]
    pub params: Map<String, Value>,
    pub select_fields: Option<Vec<String>>,
    pub exclude_fields: Option<Vec<String>>,
}

impl ExecuteRequest {
    /// Parse raw `execute` arguments in any representation.
    pub fn from_arguments(args: &ToolArguments) -> Result<Self, AgentError> {
        let entity = args.get_str("entity")?.trim();
        if entity.is_empty() {
            return Err(AgentError::InvalidArgument(
                "Argument 'entity' must not be empty".into(),
            ));
        }
        let raw_action = args.get_str("action")?;
        let action = raw_action.trim().parse::<ActionKind>().map_err(|_| {
            AgentError::InvalidArgument(format!(
                "Unknown action '{raw_action}'; expected one of: {}",
                ActionKind::names().join(", ")
            ))
        })?;
        Ok(Self {
            entity: entity.to_string(),
            action,
            params: args.get_object_opt("params")?.cloned().unwrap_or_default(),
            select_fields: args.get_string_list_opt("select_fields")?,
            exclude_fields: args.get_string_list_opt("exclude_fields")?,
        })
    }

    pub fn field_filter(&self) -> FieldFilter {
        FieldFilter {
            select_fields: self.select_fields.clone(),
            exclude_fields: self.exclude_fields.clone(),
        }
    }
}

/// Connector-bound pipeline shared by the agent's tools.
pub struct ToolPipeline {
    connector: Arc<dyn Connector>,
    config: AgentConfig,
    shaper: ResponseShaper,
    downloads: DownloadMaterializer,
}

impl ToolPipeline {
    pub fn new(connector: Arc<dyn Connector>, config: AgentConfig) -> Self {
        let downloads = DownloadMaterializer::new(config.download_dir.clone());
        Self {
            connector,
            config,
            shaper: ResponseShaper::new(),
            downloads,
        }
    }

    pub fn connector(&self) -> &Arc<dyn Connector> {
        &self.connector
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Stage 1: normalize raw arguments into a request.
    pub fn normalize(&self, raw: &Value) -> Result<ExecuteRequest, AgentError> {
        ExecuteRequest::from_arguments(&ToolArguments::new(raw.clone()))
    }

    /// Stage 2: run the request against the connector.
    pub async fn execute(&self, request: &ExecuteRequest) -> Result<ConnectorOutput, AgentError> {
        tracing::debug!(
            connector = self.connector.name(),
            entity = %request.entity,
            action = %request.action,
            "executing connector action"
        );
        self.connector
            .execute(&request.entity, request.action, request.params.clone())
            .await
    }

    /// Stage 3: shape records, or materialize a download into a file.
    pub async fn shape(
        &self,
        output: ConnectorOutput,
        request: &ExecuteRequest,
    ) -> Result<Value, AgentError> {
        match output {
            ConnectorOutput::Records(value) => {
                self.shaper
                    .shape(value, request.action, &request.field_filter())
            }
            ConnectorOutput::Download(chunks) => {
                let artifact = self.downloads.materialize(chunks, &request.entity).await?;
                Ok(serde_json::to_value(artifact)?)
            }
        }
    }

    /// Stage 4: the output-size guard for `tool_name`.
    ///
    /// The connector's per-tool budget wins over the configured one.
    pub fn guard_for(&self, tool_name: &str) -> OutputSizeGuard {
        let policy = self.connector.tool_policy(tool_name);
        let budget = policy.max_output_chars.or(self.config.max_output_chars);
        OutputSizeGuard::new(budget).with_retry_channel(self.config.retry_channel)
    }

    /// Stages 1 to 3.
    pub async fn run_execute(&self, raw: &Value) -> Result<Value, AgentError> {
        let request = self.normalize(raw)?;
        let output = self.execute(&request).await?;
        self.shape(output, &request).await
    }

    /// All stages, as the `execute` tool runs them.
    pub async fn invoke(&self, raw: &Value) -> Result<Value, AgentError> {
        let shaped = self.run_execute(raw).await?;
        self.guard_for("execute").check(shaped, "execute")
    }
}

impl std::fmt::Debug for ToolPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolPipeline")
            .field("connector", &self.connector.name())
            .field("config", &self.config)
            .finish()
    }
}
