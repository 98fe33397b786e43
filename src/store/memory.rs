use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::types::Timestamp;
use crate::store::push_id::PushIdGenerator;
use crate::store::{DocumentStore, StoreError, StorePath, StoreResult, object_children};

/// In-process document store holding a single JSON tree.
///
/// Mirrors the hosted database semantics the repositories rely on: writing
/// `null` deletes a node, emptied parents disappear, and pushed keys sort in
/// insertion order.
#[derive(Default)]
pub struct MemoryStore {
    root: RwLock<Map<String, Value>>,
    ids: PushIdGenerator,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `tree`, which must be a JSON object.
    pub fn with_tree(tree: Value) -> StoreResult<Self> {
        match tree {
            Value::Object(map) => Ok(Self {
                root: RwLock::new(map),
                ids: PushIdGenerator::new(),
            }),
            other => Err(StoreError::Serialization(format!(
                "root must be an object, got {other}"
            ))),
        }
    }

    fn read_node(&self, path: &StorePath) -> StoreResult<Option<Value>> {
        let root = self
            .root
            .read()
            .map_err(|_| StoreError::Transport("memory store lock poisoned".to_string()))?;
        let mut segments = path.segments().iter();
        let Some(first) = segments.next() else {
            return Ok(Some(Value::Object(root.clone())));
        };
        let mut node = match root.get(first) {
            Some(node) => node,
            None => return Ok(None),
        };
        for segment in segments {
            node = match node.get(segment) {
                Some(child) => child,
                None => return Ok(None),
            };
        }
        Ok(Some(node.clone()))
    }

    fn write_node(&self, path: &StorePath, value: Value) -> StoreResult<()> {
        let mut root = self
            .root
            .write()
            .map_err(|_| StoreError::Transport("memory store lock poisoned".to_string()))?;
        let segments = path.segments();
        if segments.is_empty() {
            return Err(StoreError::InvalidPath("cannot overwrite the root".to_string()));
        }
        if value.is_null() {
            remove_at(&mut root, segments);
        } else {
            insert_at(&mut root, segments, value);
        }
        Ok(())
    }
}

/// Insert `value` at `segments`, replacing any scalar found on the way with
/// an object.
fn insert_at(map: &mut Map<String, Value>, segments: &[String], value: Value) {
    let (last, parents) = match segments.split_last() {
        Some(split) => split,
        None => return,
    };
    let mut current = map;
    for segment in parents {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        current = match entry {
            Value::Object(child) => child,
            _ => return,
        };
    }
    current.insert(last.clone(), value);
}

/// Remove the node at `segments` and prune parents left empty.
fn remove_at(map: &mut Map<String, Value>, segments: &[String]) {
    let Some((first, rest)) = segments.split_first() else {
        return;
    };
    if rest.is_empty() {
        map.remove(first);
        return;
    }
    let prune = match map.get_mut(first) {
        Some(Value::Object(child)) => {
            remove_at(child, rest);
            child.is_empty()
        }
        _ => false,
    };
    if prune {
        map.remove(first);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, path: &StorePath) -> StoreResult<Option<Value>> {
        self.read_node(path)
    }

    async fn children(&self, path: &StorePath) -> StoreResult<Vec<(String, Value)>> {
        Ok(object_children(self.read_node(path)?))
    }

    async fn set(&self, path: &StorePath, value: Value) -> StoreResult<()> {
        self.write_node(path, value)
    }

    async fn push(&self, path: &StorePath, value: Value) -> StoreResult<String> {
        let key = self.ids.generate(Timestamp::now().get());
        let target = path.clone().child(&key)?;
        self.write_node(&target, value)?;
        Ok(key)
    }

    async fn remove(&self, path: &StorePath) -> StoreResult<()> {
        self.write_node(path, Value::Null)
    }

    async fn query_equal(
        &self,
        path: &StorePath,
        child: &str,
        value: &Value,
    ) -> StoreResult<Vec<(String, Value)>> {
        let mut matches = object_children(self.read_node(path)?);
        matches.retain(|(_, node)| node.get(child) == Some(value));
        Ok(matches)
    }
}
