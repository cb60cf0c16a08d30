//! An in-memory implementation of the store, mirroring the remote layout.
//!
//! This is the test double for the reconciliation engines, and doubles as a
//! scratch store for experimenting without a server. Its semantics follow the
//! remote one: absent paths read as `None`, writing `null` deletes, and
//! objects emptied by a delete disappear along with their empty ancestors.

use std::error::Error;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::mock_behaviour::MockBehaviour;
use crate::traits::DataStore;

pub struct MemoryStore {
    data: Mutex<Value>,

    /// Optional failure injection, for tests exercising store errors
    mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(Value::Object(Map::new())),
            mock_behaviour: None,
        }
    }

    pub fn new_with_mock_behaviour(mock_behaviour: Arc<Mutex<MockBehaviour>>) -> Self {
        Self {
            data: Mutex::new(Value::Object(Map::new())),
            mock_behaviour: Some(mock_behaviour),
        }
    }

    /// A snapshot of the whole tree, mostly useful for debugging tests
    pub fn dump(&self) -> Value {
        self.data.lock().unwrap().clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn get_at<'a>(node: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    let mut current = node;
    for segment in segments {
        current = current.as_object()?.get(*segment)?;
    }
    Some(current)
}

fn set_at(node: &mut Value, segments: &[&str], value: Value) {
    if segments.is_empty() {
        *node = value;
        return;
    }
    // intermediate non-object nodes get overwritten by the deeper write
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map
            .entry(segments[0].to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        set_at(child, &segments[1..], value);
    }
}

fn remove_at(node: &mut Value, segments: &[&str]) {
    let map = match node {
        Value::Object(map) => map,
        _ => return,
    };
    if segments.is_empty() {
        return;
    }
    if segments.len() == 1 {
        map.remove(segments[0]);
        return;
    }
    if let Some(child) = map.get_mut(segments[0]) {
        remove_at(child, &segments[1..]);
        // the store keeps no empty objects around
        let now_empty = child.as_object().map(|m| m.is_empty()).unwrap_or(false);
        if now_empty {
            map.remove(segments[0]);
        }
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, Box<dyn Error>> {
        if let Some(ref mb) = self.mock_behaviour {
            mb.lock().unwrap().can_get()?;
        }
        let data = self.data.lock().unwrap();
        Ok(get_at(&data, &segments(path)).cloned())
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), Box<dyn Error>> {
        if let Some(ref mb) = self.mock_behaviour {
            mb.lock().unwrap().can_set()?;
        }
        if value.is_null() {
            let mut data = self.data.lock().unwrap();
            remove_at(&mut data, &segments(path));
            return Ok(());
        }
        let mut data = self.data.lock().unwrap();
        set_at(&mut data, &segments(path), value);
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), Box<dyn Error>> {
        if let Some(ref mb) = self.mock_behaviour {
            mb.lock().unwrap().can_delete()?;
        }
        log::debug!("deleting node {}", path);
        let mut data = self.data.lock().unwrap();
        remove_at(&mut data, &segments(path));
        Ok(())
    }

    async fn push(&self, path: &str, value: Value) -> Result<String, Box<dyn Error>> {
        if let Some(ref mb) = self.mock_behaviour {
            mb.lock().unwrap().can_push()?;
        }
        let key = uuid::Uuid::new_v4().to_hyphenated().to_string();
        let mut data = self.data.lock().unwrap();
        let mut child_segments = segments(path);
        child_segments.push(&key);
        set_at(&mut data, &child_segments, value);
        Ok(key)
    }
}
