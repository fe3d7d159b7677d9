//! Streaming orchestrator for agent runs.
//!
//! [`AgentRunner::run`] pulls events from the agent runtime one at a time,
//! buffers assistant text, pairs tool-call starts with their results, and
//! dispatches consumer callbacks. The returned stream yields once after every
//! dispatched callback so the caller can do its own I/O (e.g. redraw a
//! terminal) before the next event is processed.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::AgentError;
use crate::runtime::AgentRuntime;
use crate::tools::arguments::normalize_arguments;
use crate::types::ModelMessage;

use super::consumer::RunConsumer;
use super::events::AgentStreamEvent;
use super::state::{PendingToolCalls, TextAccumulator};
use super::types::{RunId, RunResult};

/// Drives agent runs and keeps the conversation history between them.
///
/// History only ever reflects completed runs: it is replaced wholesale when
/// the runtime reports completion and left untouched by failed or
/// cancelled runs.
pub struct AgentRunner {
    runtime: Arc<dyn AgentRuntime>,
    history: Vec<ModelMessage>,
    pending: PendingToolCalls,
    last_result: Option<RunResult>,
}

impl AgentRunner {
    pub fn new(runtime: Arc<dyn AgentRuntime>) -> Self {
        Self {
            runtime,
            history: Vec::new(),
            pending: PendingToolCalls::default(),
            last_result: None,
        }
    }

    /// Start from an existing history.
    pub fn with_history(mut self, history: Vec<ModelMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn history(&self) -> &[ModelMessage] {
        &self.history
    }

    /// Forget the conversation.
    pub fn reset(&mut self) {
        self.history.clear();
        self.pending.clear();
        self.last_result = None;
    }

    /// Tool calls of the latest run that started without a matching result.
    pub fn pending_tool_calls(&self) -> &PendingToolCalls {
        &self.pending
    }

    /// Outcome of the latest run that reached an end on its own.
    pub fn last_result(&self) -> Option<&RunResult> {
        self.last_result.as_ref()
    }

    /// Run one turn for `prompt`.
    ///
    /// Yields `Ok(())` after each callback dispatched to `consumer`. A
    /// terminal runtime failure is reported through `on_error` and ends the
    /// stream; any other error is yielded as `Err` and ends the stream.
    /// Dropping the stream cancels the run.
    pub fn run<'a, C>(
        &'a mut self,
        prompt: &'a str,
        consumer: &'a mut C,
    ) -> impl Stream<Item = Result<(), AgentError>> + Send + 'a
    where
        C: RunConsumer + ?Sized,
    {
        self.run_with_id(Uuid::new_v4(), prompt, consumer)
    }

    /// Run one turn to the end, stopping early when `cancel` fires.
    pub async fn drive<C>(
        &mut self,
        prompt: &str,
        consumer: &mut C,
        cancel: Option<CancellationToken>,
    ) -> Result<RunResult, AgentError>
    where
        C: RunConsumer + ?Sized,
    {
        let run_id = Uuid::new_v4();
        let mut dispatched = 0usize;
        let mut canceled = false;
        {
            let run = self.run_with_id(run_id, prompt, consumer);
            let mut run = std::pin::pin!(run);
            loop {
                let next = match &cancel {
                    Some(token) => tokio::select! {
                        biased;
                        _ = token.cancelled() => {
                            canceled = true;
                            break;
                        }
                        item = run.next() => item,
                    },
                    None => run.next().await,
                };
                match next {
                    Some(Ok(())) => dispatched += 1,
                    Some(Err(err)) => return Err(err),
                    None => break,
                }
            }
        }

        let finished = self
            .last_result
            .clone()
            .filter(|result| result.run_id == run_id);
        if let Some(result) = finished {
            // Outcome recorded by the run itself wins over a late cancel.
            return Ok(result);
        }
        if canceled {
            tracing::debug!(%run_id, dispatched, "run canceled");
            let result = RunResult::canceled(run_id, dispatched);
            self.last_result = Some(result.clone());
            return Ok(result);
        }
        Ok(RunResult::completed(run_id, dispatched))
    }

    fn run_with_id<'a, C>(
        &'a mut self,
        run_id: RunId,
        prompt: &'a str,
        consumer: &'a mut C,
    ) -> impl Stream<Item = Result<(), AgentError>> + Send + 'a
    where
        C: RunConsumer + ?Sized,
    {
        async_stream::stream! {
            self.pending.clear();
            let mut text = TextAccumulator::default();
            let mut dispatched = 0usize;
            tracing::debug!(%run_id, history_len = self.history.len(), "run start");

            let mut events = match self.runtime.run_stream(prompt, &self.history).await {
                Ok(events) => Some(events),
                Err(AgentError::UnexpectedModelBehavior(message)) => {
                    tracing::warn!(%run_id, error = %message, "run ended by unexpected model behavior");
                    consumer.on_error(&message).await;
                    dispatched += 1;
                    self.last_result = Some(RunResult::failed(run_id, message, dispatched));
                    yield Ok(());
                    None
                }
                Err(err) => {
                    yield Err(err);
                    None
                }
            };

            while let Some(stream) = events.as_mut() {
                let Some(item) = stream.next().await else {
                    // Runtime closed the stream without reporting completion.
                    tracing::warn!(%run_id, "event stream ended before run completion");
                    let flushed = text.flush();
                    if let Some(flushed) = &flushed {
                        consumer.on_final_response(flushed).await;
                        dispatched += 1;
                    }
                    self.last_result = Some(RunResult::failed(
                        run_id,
                        "event stream ended before the run completed",
                        dispatched,
                    ));
                    if flushed.is_some() {
                        yield Ok(());
                    }
                    break;
                };

                let event = match item {
                    Ok(event) => event,
                    Err(AgentError::UnexpectedModelBehavior(message)) => {
                        tracing::warn!(%run_id, error = %message, "run ended by unexpected model behavior");
                        consumer.on_error(&message).await;
                        dispatched += 1;
                        self.last_result = Some(RunResult::failed(run_id, message, dispatched));
                        yield Ok(());
                        break;
                    }
                    Err(err) => {
                        yield Err(err);
                        break;
                    }
                };

                match event {
                    AgentStreamEvent::TextSegmentStart { content }
                    | AgentStreamEvent::TextDelta { content } => {
                        text.push(&content);
                    }
                    AgentStreamEvent::ToolCallInvoked { call_id, tool_name, args } => {
                        if let Some(flushed) = text.flush() {
                            consumer.on_intermediate_response(&flushed).await;
                            dispatched += 1;
                            yield Ok(());
                        }
                        let args = normalize_arguments(&args);
                        tracing::debug!(%run_id, %call_id, tool = %tool_name, "tool call start");
                        self.pending.register(call_id.clone(), args.clone());
                        consumer.on_tool_call_start(&tool_name, &args, &call_id).await;
                        dispatched += 1;
                        yield Ok(());
                    }
                    AgentStreamEvent::ToolCallCompleted { call_id, tool_name, outcome } => {
                        let args = self.pending.resolve(&call_id);
                        let is_error = outcome.is_error();
                        tracing::debug!(%run_id, %call_id, tool = %tool_name, is_error, "tool call end");
                        consumer
                            .on_tool_call_end(&tool_name, &args, &outcome.display(), is_error, &call_id)
                            .await;
                        dispatched += 1;
                        yield Ok(());
                    }
                    AgentStreamEvent::RunCompleted { messages } => {
                        tracing::debug!(%run_id, history_len = messages.len(), "run completed");
                        self.history = messages;
                        let flushed = text.flush();
                        if let Some(flushed) = &flushed {
                            consumer.on_final_response(flushed).await;
                            dispatched += 1;
                        }
                        // Set before the final yield; `drive` may stop there.
                        self.last_result = Some(RunResult::completed(run_id, dispatched));
                        if flushed.is_some() {
                            yield Ok(());
                        }
                        break;
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for AgentRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRunner")
            .field("history_len", &self.history.len())
            .field("pending", &self.pending.len())
            .field("last_result", &self.last_result)
            .finish()
    }
}
