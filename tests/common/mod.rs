//! Shared test helpers: scripted runtime, in-memory connector, recording consumer.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{Map, Value};

use connector_agent::agent_loop::{AgentStreamEvent, RunConsumer, ToolCallOutcome};
use connector_agent::connector::{Connector, ConnectorOutput, EntityInfo, ToolPolicy};
use connector_agent::error::AgentError;
use connector_agent::runtime::{AgentRuntime, EventStream};
use connector_agent::tools::ActionKind;
use connector_agent::types::ModelMessage;

/// One scripted run: either `run_stream` fails, or it returns these items.
pub type Script = Result<Vec<Result<AgentStreamEvent, AgentError>>, AgentError>;

/// Runtime that replays queued scripts, one per run.
#[derive(Default)]
pub struct ScriptedRuntime {
    scripts: Mutex<VecDeque<Script>>,
    seen_histories: Mutex<Vec<Vec<ModelMessage>>>,
}

impl ScriptedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_events(&self, events: Vec<AgentStreamEvent>) {
        self.push(Ok(events.into_iter().map(Ok).collect()));
    }

    pub fn push(&self, script: Script) {
        self.scripts.lock().unwrap().push_back(script);
    }

    /// Histories passed to `run_stream`, oldest first.
    pub fn seen_histories(&self) -> Vec<Vec<ModelMessage>> {
        self.seen_histories.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentRuntime for ScriptedRuntime {
    async fn run_stream(
        &self,
        _prompt: &str,
        history: &[ModelMessage],
    ) -> Result<EventStream, AgentError> {
        self.seen_histories.lock().unwrap().push(history.to_vec());
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()));
        Ok(futures::stream::iter(script?).boxed())
    }
}

pub fn segment_start(content: &str) -> AgentStreamEvent {
    AgentStreamEvent::TextSegmentStart {
        content: content.to_string(),
    }
}

pub fn text(content: &str) -> AgentStreamEvent {
    AgentStreamEvent::TextDelta {
        content: content.to_string(),
    }
}

pub fn tool_start(call_id: &str, tool_name: &str, args: Value) -> AgentStreamEvent {
    AgentStreamEvent::ToolCallInvoked {
        call_id: call_id.to_string(),
        tool_name: tool_name.to_string(),
        args,
    }
}

pub fn tool_end(call_id: &str, tool_name: &str, outcome: ToolCallOutcome) -> AgentStreamEvent {
    AgentStreamEvent::ToolCallCompleted {
        call_id: call_id.to_string(),
        tool_name: tool_name.to_string(),
        outcome,
    }
}

pub fn completed(messages: Vec<ModelMessage>) -> AgentStreamEvent {
    AgentStreamEvent::RunCompleted { messages }
}

/// A callback received by [`RecordingConsumer`].
#[derive(Debug, Clone, PartialEq)]
pub enum Callback {
    ToolStart {
        tool_name: String,
        args: Map<String, Value>,
        call_id: String,
    },
    ToolEnd {
        tool_name: String,
        args: Map<String, Value>,
        result: String,
        is_error: bool,
        call_id: String,
    },
    Intermediate(String),
    Final(String),
    Error(String),
}

#[derive(Debug, Default)]
pub struct RecordingConsumer {
    pub calls: Vec<Callback>,
}

#[async_trait]
impl RunConsumer for RecordingConsumer {
    async fn on_tool_call_start(&mut self, tool_name: &str, args: &Map<String, Value>, call_id: &str) {
        self.calls.push(Callback::ToolStart {
            tool_name: tool_name.to_string(),
            args: args.clone(),
            call_id: call_id.to_string(),
        });
    }

    async fn on_tool_call_end(
        &mut self,
        tool_name: &str,
        args: &Map<String, Value>,
        result: &str,
        is_error: bool,
        call_id: &str,
    ) {
        self.calls.push(Callback::ToolEnd {
            tool_name: tool_name.to_string(),
            args: args.clone(),
            result: result.to_string(),
            is_error,
            call_id: call_id.to_string(),
        });
    }

    async fn on_intermediate_response(&mut self, text: &str) {
        self.calls.push(Callback::Intermediate(text.to_string()));
    }

    async fn on_final_response(&mut self, text: &str) {
        self.calls.push(Callback::Final(text.to_string()));
    }

    async fn on_error(&mut self, message: &str) {
        self.calls.push(Callback::Error(message.to_string()));
    }
}

/// Connector serving canned records and downloads from memory.
#[derive(Default)]
pub struct MemoryConnector {
    records: HashMap<(String, ActionKind), Value>,
    downloads: HashMap<String, Vec<Vec<u8>>>,
    schemas: HashMap<String, Value>,
    policies: HashMap<String, ToolPolicy>,
    instructions: Option<String>,
    calls: Mutex<Vec<(String, ActionKind, Map<String, Value>)>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(mut self, entity: &str, action: ActionKind, result: Value) -> Self {
        self.records.insert((entity.to_string(), action), result);
        self
    }

    pub fn with_download(mut self, entity: &str, chunks: Vec<Vec<u8>>) -> Self {
        self.downloads.insert(entity.to_string(), chunks);
        self
    }

    pub fn with_schema(mut self, entity: &str, schema: Value) -> Self {
        self.schemas.insert(entity.to_string(), schema);
        self
    }

    pub fn with_policy(mut self, tool_name: &str, policy: ToolPolicy) -> Self {
        self.policies.insert(tool_name.to_string(), policy);
        self
    }

    pub fn with_instructions(mut self, instructions: &str) -> Self {
        self.instructions = Some(instructions.to_string());
        self
    }

    /// `(entity, action, params)` of every `execute` call, in order.
    pub fn calls(&self) -> Vec<(String, ActionKind, Map<String, Value>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    fn name(&self) -> &str {
        "memory"
    }

    async fn execute(
        &self,
        entity: &str,
        action: ActionKind,
        params: Map<String, Value>,
    ) -> Result<ConnectorOutput, AgentError> {
        self.calls
            .lock()
            .unwrap()
            .push((entity.to_string(), action, params));
        if action == ActionKind::Download {
            if let Some(chunks) = self.downloads.get(entity) {
                let chunks: Vec<Result<Vec<u8>, AgentError>> =
                    chunks.iter().cloned().map(Ok).collect();
                return Ok(ConnectorOutput::Download(futures::stream::iter(chunks).boxed()));
            }
        }
        self.records
            .get(&(entity.to_string(), action))
            .cloned()
            .map(ConnectorOutput::Records)
            .ok_or_else(|| {
                AgentError::connector("memory", format!("no {action} result for '{entity}'"))
            })
    }

    async fn list_entities(&self) -> Result<Vec<EntityInfo>, AgentError> {
        let mut entities: HashMap<&str, Vec<ActionKind>> = HashMap::new();
        for (entity, action) in self.records.keys() {
            entities.entry(entity).or_default().push(*action);
        }
        for entity in self.downloads.keys() {
            entities.entry(entity).or_default().push(ActionKind::Download);
        }
        let mut infos: Vec<EntityInfo> = entities
            .into_iter()
            .map(|(name, mut actions)| {
                actions.sort_by_key(|action| action.to_string());
                EntityInfo {
                    name: name.to_string(),
                    description: None,
                    actions,
                }
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(infos)
    }

    async fn entity_schema(&self, entity: &str) -> Result<Option<Value>, AgentError> {
        Ok(self.schemas.get(entity).cloned())
    }

    fn instructions(&self) -> Option<String> {
        self.instructions.clone()
    }

    fn tool_policy(&self, tool_name: &str) -> ToolPolicy {
        self.policies.get(tool_name).cloned().unwrap_or_default()
    }
}
