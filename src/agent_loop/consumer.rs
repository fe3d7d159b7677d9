//! Callback consumer for orchestrated runs.

use async_trait::async_trait;
use serde_json::{Map, Value};

/// Receives the callbacks of a run. Every method defaults to a no-op.
#[async_trait]
pub trait RunConsumer: Send {
    async fn on_tool_call_start(
        &mut self,
        _tool_name: &str,
        _args: &Map<String, Value>,
        _call_id: &str,
    ) {
    }

    /// `result` is the tool output as display text.
    async fn on_tool_call_end(
        &mut self,
        _tool_name: &str,
        _args: &Map<String, Value>,
        _result: &str,
        _is_error: bool,
        _call_id: &str,
    ) {
    }

    /// Text the assistant produced before calling a tool.
    async fn on_intermediate_response(&mut self, _text: &str) {}

    /// Text the assistant produced at the end of the run.
    async fn on_final_response(&mut self, _text: &str) {}

    async fn on_error(&mut self, _message: &str) {}
}

/// Consumer that ignores every callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopConsumer;

impl RunConsumer for NoopConsumer {}
