//! Allow-list / block-list projection over records using dot-separated paths.
//!
//! A path such as `"content.topics"` addresses the `topics` key inside the
//! `content` mapping. Lists met along a path are traversed element-wise, so
//! `"attachments.url"` reaches the `url` of every attachment.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Whether listed paths are kept or removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    /// Keep only the listed paths.
    Allow,
    /// Drop the listed paths, keep everything else.
    Block,
}

#[derive(Debug, Clone, PartialEq)]
enum PathNode {
    /// The whole subtree is addressed.
    Whole,
    Children(BTreeMap<String, PathNode>),
}

fn insert_path(children: &mut BTreeMap<String, PathNode>, segments: &[&str]) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    if rest.is_empty() {
        children.insert((*head).to_string(), PathNode::Whole);
        return;
    }
    let node = children
        .entry((*head).to_string())
        .or_insert_with(|| PathNode::Children(BTreeMap::new()));
    if let PathNode::Children(grandchildren) = node {
        insert_path(grandchildren, rest);
    }
}

/// A compiled set of field paths applied in one mode.
#[derive(Debug, Clone)]
pub struct FieldProjection {
    mode: FieldMode,
    root: BTreeMap<String, PathNode>,
}

impl FieldProjection {
    /// Compile `paths`; empty paths and empty segments are ignored.
    pub fn new<S: AsRef<str>>(paths: &[S], mode: FieldMode) -> Self {
        let mut root = BTreeMap::new();
        for path in paths {
            let segments: Vec<&str> = path
                .as_ref()
                .split('.')
                .map(str::trim)
                .filter(|segment| !segment.is_empty())
                .collect();
            insert_path(&mut root, &segments);
        }
        Self { mode, root }
    }

    pub fn mode(&self) -> FieldMode {
        self.mode
    }

    /// Project a single record or every record of a list.
    pub fn apply(&self, value: &Value) -> Value {
        match value {
            Value::Array(records) => {
                Value::Array(records.iter().map(|record| self.apply_record(record)).collect())
            }
            other => self.apply_record(other),
        }
    }

    fn apply_record(&self, record: &Value) -> Value {
        let Value::Object(map) = record else {
            return record.clone();
        };
        let projected = match self.mode {
            FieldMode::Allow => allow(map, &self.root),
            FieldMode::Block => block(map, &self.root),
        };
        Value::Object(projected)
    }
}

/// Project `value` with `paths` in the given mode.
pub fn project<S: AsRef<str>>(value: &Value, paths: &[S], mode: FieldMode) -> Value {
    FieldProjection::new(paths, mode).apply(value)
}

fn allow(map: &Map<String, Value>, nodes: &BTreeMap<String, PathNode>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, node) in nodes {
        let Some(value) = map.get(key) else {
            continue;
        };
        match (node, value) {
            (PathNode::Whole, _) => {
                out.insert(key.clone(), value.clone());
            }
            (PathNode::Children(children), Value::Object(inner)) => {
                out.insert(key.clone(), Value::Object(allow(inner, children)));
            }
            (PathNode::Children(children), Value::Array(items)) => {
                let items = items
                    .iter()
                    .filter_map(|item| match item {
                        Value::Object(inner) => Some(Value::Object(allow(inner, children))),
                        _ => None,
                    })
                    .collect();
                out.insert(key.clone(), Value::Array(items));
            }
            // A nested path cannot reach inside a scalar.
            (PathNode::Children(_), _) => {}
        }
    }
    out
}

fn block(map: &Map<String, Value>, nodes: &BTreeMap<String, PathNode>) -> Map<String, Value> {
    let mut out = map.clone();
    for (key, node) in nodes {
        match node {
            PathNode::Whole => {
                out.remove(key);
            }
            PathNode::Children(children) => {
                let Some(value) = out.get_mut(key) else {
                    continue;
                };
                match value {
                    Value::Object(inner) => *inner = block(inner, children),
                    Value::Array(items) => {
                        for item in items.iter_mut() {
                            if let Value::Object(inner) = item {
                                *inner = block(inner, children);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record() -> Value {
        json!({
            "id": "1",
            "title": "Quarterly sync",
            "content": {"topics": ["billing", "roadmap"], "summary": "long", "score": 3},
            "owner": {"name": "Ada"},
        })
    }

    #[test]
    fn allow_keeps_only_listed_paths_with_containers() {
        let out = project(&record(), &["id", "content.topics"], FieldMode::Allow);
        assert_eq!(
            out,
            json!({"id": "1", "content": {"topics": ["billing", "roadmap"]}})
        );
    }

    #[test]
    fn block_removes_listed_paths_only() {
        let out = project(&record(), &["content.summary", "owner"], FieldMode::Block);
        assert_eq!(
            out,
            json!({
                "id": "1",
                "title": "Quarterly sync",
                "content": {"topics": ["billing", "roadmap"], "score": 3},
            })
        );
    }

    #[test]
    fn whole_path_wins_over_nested_path() {
        let out = project(&record(), &["content.topics", "content"], FieldMode::Allow);
        assert_eq!(out["content"], record()["content"]);
    }

    #[test]
    fn lists_are_projected_element_wise() {
        let records = json!([{"id": 1, "x": 1}, {"id": 2, "x": 2}, "not a record"]);
        let out = project(&records, &["id"], FieldMode::Allow);
        assert_eq!(out, json!([{"id": 1}, {"id": 2}, "not a record"]));
    }

    #[test]
    fn nested_lists_are_traversed() {
        let value = json!({"attachments": [{"url": "a", "size": 1}, {"url": "b", "size": 2}]});
        let allowed = project(&value, &["attachments.url"], FieldMode::Allow);
        assert_eq!(allowed, json!({"attachments": [{"url": "a"}, {"url": "b"}]}));
        let blocked = project(&value, &["attachments.size"], FieldMode::Block);
        assert_eq!(blocked, allowed);
    }

    #[test]
    fn non_mapping_input_passes_through() {
        assert_eq!(project(&json!("text"), &["id"], FieldMode::Allow), json!("text"));
        assert_eq!(project(&json!(null), &["id"], FieldMode::Block), json!(null));
    }

    #[test]
    fn select_matches_excluding_the_complement() {
        let original = record();
        let selected = project(&original, &["id", "owner"], FieldMode::Allow);
        let complement: Vec<String> = original
            .as_object()
            .unwrap()
            .keys()
            .filter(|k| *k != "id" && *k != "owner")
            .cloned()
            .collect();
        let excluded = project(&original, &complement, FieldMode::Block);
        let selected_keys: Vec<_> = selected.as_object().unwrap().keys().collect();
        let excluded_keys: Vec<_> = excluded.as_object().unwrap().keys().collect();
        assert_eq!(selected_keys, excluded_keys);
    }

    #[test]
    fn blank_paths_are_ignored() {
        let out = project(&record(), &["", " . "], FieldMode::Block);
        assert_eq!(out, record());
    }
}
