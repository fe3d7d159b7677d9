//! Tool call argument normalization and typed access.

use serde_json::{Map, Value};

use crate::error::AgentError;

/// Coerce raw tool-call arguments into a key/value mapping.
///
/// Objects are returned as-is and strings are parsed as JSON. Anything else,
/// including strings that do not parse to an object, yields an empty mapping.
pub fn normalize_arguments(raw: &Value) -> Map<String, Value> {
    match raw {
        Value::Object(map) => map.clone(),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => Map::new(),
        },
        _ => Map::new(),
    }
}

/// Wrapper around tool call arguments providing typed extraction.
#[derive(Debug, Clone)]
pub struct ToolArguments {
    value: Map<String, Value>,
}

impl ToolArguments {
    /// Build from raw arguments in any representation a provider may send.
    pub fn new(raw: Value) -> Self {
        Self {
            value: normalize_arguments(&raw),
        }
    }

    pub fn from_map(value: Map<String, Value>) -> Self {
        Self { value }
    }

    /// Get the normalized mapping.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.value
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.value)
    }

    /// Get a string argument by key.
    pub fn get_str(&self, key: &str) -> Result<&str, AgentError> {
        self.value
            .get(key)
            .and_then(|v| v.as_str())
            .ok_or_else(|| AgentError::InvalidArgument(format!("Missing string argument: {key}")))
    }

    /// Get an optional string argument.
    pub fn get_str_opt(&self, key: &str) -> Option<&str> {
        self.value.get(key).and_then(|v| v.as_str())
    }

    /// Get an optional object argument; `null` counts as absent.
    pub fn get_object_opt(&self, key: &str) -> Result<Option<&Map<String, Value>>, AgentError> {
        match self.value.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(map)) => Ok(Some(map)),
            Some(_) => Err(AgentError::InvalidArgument(format!(
                "Argument '{key}' must be an object"
            ))),
        }
    }

    /// Get an optional list of strings; `null` counts as absent.
    pub fn get_string_list_opt(&self, key: &str) -> Result<Option<Vec<String>>, AgentError> {
        let items = match self.value.get(key) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(AgentError::InvalidArgument(format!(
                    "Argument '{key}' must be a list of strings"
                )))
            }
        };
        items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    AgentError::InvalidArgument(format!(
                        "Argument '{key}' must be a list of strings"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Deserialize the entire arguments into a typed struct.
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> Result<T, AgentError> {
        serde_json::from_value(Value::Object(self.value.clone())).map_err(|e| {
            AgentError::InvalidArgument(format!("Failed to deserialize arguments: {e}"))
        })
    }
}
