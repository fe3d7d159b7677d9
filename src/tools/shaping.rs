//! Shaping of connector results before they reach the model.
//!
//! Shaping extracts the records from their envelope, applies field
//! projection, truncates long strings (collections only), strips empty
//! values, and writes the records back into the envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use super::fields::{FieldMode, FieldProjection};
use crate::error::AgentError;

/// Strings longer than this many characters are cut in collection responses.
pub const MAX_TEXT_FIELD_CHARS: usize = 200;

/// Appended to every truncated string.
pub const TRUNCATION_SUFFIX: &str =
    "... [truncated; use the 'get' action with this record's id to retrieve the full value]";

/// Connector action kinds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActionKind {
    List,
    Search,
    Get,
    Create,
    Update,
    Delete,
    Download,
}

impl ActionKind {
    /// Envelope shape returned by this action.
    pub fn envelope(self) -> Envelope {
        match self {
            Self::List => Envelope::Collection {
                key: "data",
                hit_key: None,
            },
            Self::Search => Envelope::Collection {
                key: "hits",
                hit_key: Some("data"),
            },
            Self::Get | Self::Create | Self::Update | Self::Delete | Self::Download => {
                Envelope::Singular
            }
        }
    }

    /// Supported action names, for error messages.
    pub fn names() -> &'static [&'static str] {
        &["list", "search", "get", "create", "update", "delete", "download"]
    }
}

/// Where the records of interest live inside a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// Records live under `key`; with `hit_key`, each element nests its
    /// payload under that sub-key.
    Collection {
        key: &'static str,
        hit_key: Option<&'static str>,
    },
    /// The response is the record itself.
    Singular,
}

/// Field selection requested alongside an action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldFilter {
    pub select_fields: Option<Vec<String>>,
    pub exclude_fields: Option<Vec<String>>,
}

impl FieldFilter {
    /// `select_fields` wins when both lists are supplied. Empty lists count
    /// as absent.
    fn projection(&self, hit_key: Option<&str>) -> Option<FieldProjection> {
        let select = self.select_fields.as_ref().filter(|paths| !paths.is_empty());
        let exclude = self.exclude_fields.as_ref().filter(|paths| !paths.is_empty());
        let (paths, mode) = match (select, exclude) {
            (Some(select), _) => (select, FieldMode::Allow),
            (None, Some(exclude)) => (exclude, FieldMode::Block),
            (None, None) => return None,
        };
        let paths: Vec<String> = match hit_key {
            Some(prefix) => paths.iter().map(|path| format!("{prefix}.{path}")).collect(),
            None => paths.clone(),
        };
        Some(FieldProjection::new(&paths, mode))
    }
}

/// Applies the shaping pipeline to a connector result.
#[derive(Debug, Clone, Copy)]
pub struct ResponseShaper {
    max_text_chars: usize,
}

impl Default for ResponseShaper {
    fn default() -> Self {
        Self {
            max_text_chars: MAX_TEXT_FIELD_CHARS,
        }
    }
}

impl ResponseShaper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shape `result` for `action`.
    ///
    /// Fails with [`AgentError::ContractViolation`] when a collection response
    /// lacks its envelope key.
    pub fn shape(
        &self,
        result: Value,
        action: ActionKind,
        filter: &FieldFilter,
    ) -> Result<Value, AgentError> {
        match action.envelope() {
            Envelope::Singular => {
                let projected = match filter.projection(None) {
                    Some(projection) => projection.apply(&result),
                    None => result,
                };
                Ok(compact(projected))
            }
            Envelope::Collection { key, hit_key } => {
                let mut envelope = match result {
                    Value::Object(map) => map,
                    other => {
                        return Err(contract_violation(action, key, &other));
                    }
                };
                let Some(records) = envelope.remove(key) else {
                    return Err(contract_violation(
                        action,
                        key,
                        &Value::Object(envelope),
                    ));
                };
                let projected = match filter.projection(hit_key) {
                    Some(projection) => projection.apply(&records),
                    None => records,
                };
                let truncated = truncate_long_strings(projected, self.max_text_chars);
                tracing::debug!(action = %action, envelope_key = key, "shaped collection response");
                envelope.insert(key.to_string(), compact(truncated));
                Ok(Value::Object(envelope))
            }
        }
    }
}

fn contract_violation(action: ActionKind, key: &str, result: &Value) -> AgentError {
    let present_keys = match result {
        Value::Object(map) => map.keys().cloned().collect(),
        _ => Vec::new(),
    };
    AgentError::ContractViolation {
        action: action.to_string(),
        missing_key: key.to_string(),
        present_keys,
    }
}

/// Cut every string longer than `max_chars` characters, at any depth.
pub fn truncate_long_strings(value: Value, max_chars: usize) -> Value {
    match value {
        Value::String(text) => Value::String(truncate_text(text, max_chars)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| truncate_long_strings(item, max_chars))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, item)| (key, truncate_long_strings(item, max_chars)))
                .collect(),
        ),
        other => other,
    }
}

fn truncate_text(text: String, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => {
            let mut truncated = text[..cut].to_string();
            truncated.push_str(TRUNCATION_SUFFIX);
            truncated
        }
        None => text,
    }
}

/// Recursively drop nulls, empty strings, empty lists and empty mappings.
///
/// Containers emptied by the pass are dropped as well; a root that ends up
/// empty is returned as the empty container.
pub fn compact(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(compact_map(map)),
        Value::Array(items) => Value::Array(compact_items(items)),
        other => other,
    }
}

fn compact_map(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .map(|(key, value)| (key, compact(value)))
        .filter(|(_, value)| !is_empty_value(value))
        .collect()
}

fn compact_items(items: Vec<Value>) -> Vec<Value> {
    items
        .into_iter()
        .map(compact)
        .filter(|value| !is_empty_value(value))
        .collect()
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
