//! In-memory document store.
//!
//! Behaves like the hosted store for the operations the API uses: empty
//! objects and `null` values are never stored, and writing below a scalar
//! replaces it with an object.

use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::{DocumentStore, StoreError, path_segments};

/// A JSON tree held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    root: RwLock<Value>,
    next_key: AtomicU64,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose root holds `root`.
    #[must_use]
    pub fn with_root(root: Value) -> Self {
        Self {
            root: RwLock::new(prune(root)),
            next_key: AtomicU64::new(0),
        }
    }

    /// Generates a child key that sorts after every key generated before it.
    fn generate_key(&self) -> String {
        let n = self.next_key.fetch_add(1, Ordering::Relaxed);
        format!("-K{n:018}")
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.iter().all(Value::is_null),
        _ => false,
    }
}

/// Drops empty children recursively, turning an empty result into `null`.
fn prune(value: Value) -> Value {
    let value = match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, prune(v)))
                .filter(|(_, v)| !v.is_null())
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(prune).collect()),
        other => other,
    };
    if is_empty(&value) { Value::Null } else { value }
}

fn lookup<'a>(mut node: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    for segment in segments {
        node = match node {
            Value::Object(map) => map.get(*segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(node)
}

/// Returns `node` with the location at `segments` replaced by `value`.
fn replace(node: Value, segments: &[&str], value: Value) -> Value {
    let Some((first, rest)) = segments.split_first() else {
        return prune(value);
    };

    let mut map = match node {
        Value::Object(map) => map,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => Map::new(),
    };

    let child = map.remove(*first).unwrap_or(Value::Null);
    let child = replace(child, rest, value);
    if !child.is_null() {
        map.insert((*first).to_string(), child);
    }

    if map.is_empty() {
        Value::Null
    } else {
        Value::Object(map)
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let segments = path_segments(path)?;
        let root = self.root.read().await;
        Ok(lookup(&root, &segments)
            .filter(|v| !is_empty(v))
            .cloned())
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let segments = path_segments(path)?;
        let mut root = self.root.write().await;
        let current = std::mem::take(&mut *root);
        *root = replace(current, &segments, value);
        Ok(())
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        let base = path_segments(path)?;
        let mut keyed = Vec::with_capacity(fields.len());
        for (key, value) in fields {
            let mut segments: Vec<String> = base.iter().map(ToString::to_string).collect();
            segments.extend(path_segments(&key)?.into_iter().map(str::to_string));
            keyed.push((segments, value));
        }

        let mut root = self.root.write().await;
        for (segments, value) in keyed {
            let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
            let current = std::mem::take(&mut *root);
            *root = replace(current, &segments, value);
        }
        Ok(())
    }

    async fn push(&self, path: &str, value: Value) -> Result<String, StoreError> {
        let mut segments = path_segments(path)?;
        let key = self.generate_key();
        segments.push(&key);

        let mut root = self.root.write().await;
        let current = std::mem::take(&mut *root);
        *root = replace(current, &segments, value);
        drop(root);

        Ok(key)
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.set(path, Value::Null).await
    }
}
