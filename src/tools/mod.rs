//! Tools exposed to the agent and the shaping pipeline behind them.

pub mod arguments;
pub mod connector_tools;
pub mod download;
pub mod fields;
pub mod guard;
pub mod pipeline;
pub mod shaping;
pub mod tool;
pub mod types;

pub use arguments::{normalize_arguments, ToolArguments};
pub use connector_tools::connector_tools;
pub use download::{DownloadArtifact, DownloadMaterializer};
pub use fields::{FieldMode, FieldProjection};
pub use guard::OutputSizeGuard;
pub use pipeline::{ExecuteRequest, ToolPipeline};
pub use shaping::{ActionKind, FieldFilter, ResponseShaper};
pub use tool::{AgentTool, GuardedTool, Tool, ToolExecutionContext};
pub use types::AgentToolParameters;
