//! Agent runtime trait: the language-model loop that produces run events.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::agent_loop::AgentStreamEvent;
use crate::error::AgentError;
use crate::types::ModelMessage;

/// Ordered event stream of a single run.
pub type EventStream = BoxStream<'static, Result<AgentStreamEvent, AgentError>>;

/// Core trait implemented by agent runtimes.
///
/// Unrecoverable model failures must surface as
/// [`AgentError::UnexpectedModelBehavior`], either from `run_stream` or as a
/// stream item. Every other error is treated as fatal to the run.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Start a run for `prompt` continuing from `history`.
    async fn run_stream(
        &self,
        prompt: &str,
        history: &[ModelMessage],
    ) -> Result<EventStream, AgentError>;
}
