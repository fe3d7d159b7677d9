//! The tools a connector-backed agent is given.
//!
//! [`connector_tools`] builds `connector_info`, `execute`, `entity_schema`,
//! `current_datetime` and `get_instructions` over one [`ToolPipeline`]. Each
//! tool is wrapped in a [`GuardedTool`] carrying the connector's docs and
//! output budget for that tool.
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use connector_agent::connector::Connector;
//! use connector_agent::config::AgentConfig;
//! use connector_agent::tools::{connector_tools, ToolPipeline};
//!
//! # fn example(connector: Arc<dyn Connector>) {
//! let pipeline = Arc::new(ToolPipeline::new(connector, AgentConfig::new()));
//! let tools = connector_tools(pipeline);
//! assert_eq!(tools.len(), 5);
//! # }
//! ```

use std::sync::Arc;

use serde_json::{json, Value};

use super::arguments::ToolArguments;
use super::pipeline::ToolPipeline;
use super::shaping::ActionKind;
use super::tool::{AgentTool, GuardedTool, Tool, ToolExecutionContext};
use super::types::AgentToolParameters;
use crate::error::AgentError;

pub const CONNECTOR_INFO: &str = "connector_info";
pub const EXECUTE: &str = "execute";
pub const ENTITY_SCHEMA: &str = "entity_schema";
pub const CURRENT_DATETIME: &str = "current_datetime";
pub const GET_INSTRUCTIONS: &str = "get_instructions";

/// Guidance returned by `get_instructions` when neither the configuration
/// nor the connector supplies any.
pub const DEFAULT_INSTRUCTIONS: &str = "\
Use `connector_info` to see which entities exist and the actions each supports, \
and `entity_schema` to learn an entity's fields before querying it.

Call `execute` with an `entity`, an `action` and action-specific `params`. \
List and search results are shortened: long text values are truncated and empty \
values are dropped. Use the `get` action with a record's id to read it in full.

Keep results small. Pass `select_fields` (dot-separated paths such as \
`content.topics`) to return only the fields you need, or `exclude_fields` to drop \
large ones. If both are given, `select_fields` wins. When a result is too large \
you will be asked to retry with a narrower query: select fewer fields, add \
filters, or lower the limit.

The `download` action saves the content to a local file and returns its path \
and size instead of the bytes.";

/// Build the five connector tools, each guarded per the connector's policy.
pub fn connector_tools(pipeline: Arc<ToolPipeline>) -> Vec<Arc<dyn Tool>> {
    let tools: [Arc<dyn Tool>; 5] = [
        connector_info_tool(pipeline.clone()),
        execute_tool(pipeline.clone()),
        entity_schema_tool(pipeline.clone()),
        current_datetime_tool(),
        get_instructions_tool(pipeline.clone()),
    ];
    tools
        .into_iter()
        .map(|tool| guard(&pipeline, tool))
        .collect()
}

fn guard(pipeline: &ToolPipeline, tool: Arc<dyn Tool>) -> Arc<dyn Tool> {
    let name = tool.name().to_string();
    let policy = pipeline.connector().tool_policy(&name);
    Arc::new(GuardedTool::new(
        tool,
        policy.docs.as_deref(),
        pipeline.guard_for(&name),
    ))
}

fn connector_info_tool(pipeline: Arc<ToolPipeline>) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        CONNECTOR_INFO,
        "Describe the connected data source and the entities it exposes",
        AgentToolParameters::empty(),
        move |_args, _ctx: ToolExecutionContext| {
            let pipeline = pipeline.clone();
            async move { connector_info(&pipeline).await }
        },
    ))
}

async fn connector_info(pipeline: &ToolPipeline) -> Result<Value, AgentError> {
    let connector = pipeline.connector();
    let entities = connector.list_entities().await?;
    Ok(json!({
        "connector": connector.name(),
        "entities": entities,
    }))
}

fn execute_tool(pipeline: Arc<ToolPipeline>) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        EXECUTE,
        "Run an action on a connector entity and return the shaped result",
        AgentToolParameters::object()
            .string("entity", "Entity to operate on, e.g. \"calls\"", true)
            .string_enum("action", "Action to perform", ActionKind::names(), true)
            .object("params", "Action-specific parameters (filters, limit, id, ...)", false)
            .string_array(
                "select_fields",
                "Only return these dot-separated field paths",
                false,
            )
            .string_array(
                "exclude_fields",
                "Drop these dot-separated field paths (ignored when select_fields is set)",
                false,
            )
            .build(),
        move |args, _ctx: ToolExecutionContext| {
            let pipeline = pipeline.clone();
            async move { pipeline.run_execute(&args.into_value()).await }
        },
    ))
}

fn entity_schema_tool(pipeline: Arc<ToolPipeline>) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        ENTITY_SCHEMA,
        "Return the JSON schema of an entity's records",
        AgentToolParameters::object()
            .string("entity", "Entity name", true)
            .build(),
        move |args, _ctx: ToolExecutionContext| {
            let pipeline = pipeline.clone();
            async move { entity_schema(&pipeline, &args).await }
        },
    ))
}

async fn entity_schema(pipeline: &ToolPipeline, args: &ToolArguments) -> Result<Value, AgentError> {
    let entity = args.get_str("entity")?;
    let schema = pipeline.connector().entity_schema(entity).await?;
    Ok(match schema {
        Some(schema) => json!({ "entity": entity, "schema": schema }),
        None => json!({
            "entity": entity,
            "schema": null,
            "message": format!(
                "No schema is available for entity '{entity}'. \
                 Use connector_info to check the entity name."
            ),
        }),
    })
}

fn current_datetime_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        CURRENT_DATETIME,
        "Return the current date and time in UTC",
        AgentToolParameters::empty(),
        |_args, _ctx: ToolExecutionContext| async move {
            let now = chrono::Utc::now();
            Ok(json!({
                "utc": now.to_rfc3339(),
                "unix_seconds": now.timestamp(),
            }))
        },
    ))
}

fn get_instructions_tool(pipeline: Arc<ToolPipeline>) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        GET_INSTRUCTIONS,
        "Return usage instructions for this connector",
        AgentToolParameters::empty(),
        move |_args, _ctx: ToolExecutionContext| {
            let pipeline = pipeline.clone();
            async move {
                let instructions = pipeline
                    .config()
                    .instructions
                    .clone()
                    .or_else(|| pipeline.connector().instructions())
                    .unwrap_or_else(|| DEFAULT_INSTRUCTIONS.to_string());
                Ok(json!({ "instructions": instructions }))
            }
        },
    ))
}
