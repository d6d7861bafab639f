//! In-memory implementation of StoreAdapter for development and testing

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use super::{StoreAdapter, StoreError};

/// In-memory hierarchical store
///
/// Holds a single JSON tree behind an `RwLock`. Intermediate objects are
/// created on write, and non-object nodes along a write path are replaced,
/// matching the merge semantics of the external store it stands in for.
///
/// Two knobs exist for tests: [`set_offline`](Self::set_offline) makes every
/// operation fail with [`StoreError::Unavailable`], and
/// [`read_count`](Self::read_count) reports how many `get` calls reached the
/// backend (used to assert that cache hits skip the store).
#[derive(Clone)]
pub struct InMemoryStore {
    root: Arc<RwLock<Value>>,
    offline: Arc<AtomicBool>,
    reads: Arc<AtomicUsize>,
}

impl InMemoryStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self {
            root: Arc::new(RwLock::new(Value::Object(Map::new()))),
            offline: Arc::new(AtomicBool::new(false)),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Simulate a backend outage: while offline, every operation fails
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of `get` calls that reached the backend
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                message: "store is offline".to_string(),
            });
        }
        Ok(())
    }

    fn segments(path: &str) -> Vec<&str> {
        path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Walk down to the object holding the last path segment, creating
    /// intermediate objects as needed. Returns the parent map and final key.
    fn descend<'a>(root: &'a mut Value, segments: &[&str]) -> (&'a mut Map<String, Value>, String) {
        let (last, parents) = segments.split_last().expect("path must be non-empty");
        let mut node = root;
        for seg in parents {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            node = node
                .as_object_mut()
                .expect("just ensured object")
                .entry(seg.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        (node.as_object_mut().expect("just ensured object"), last.to_string())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StoreAdapter for InMemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        self.check_online()?;
        self.reads.fetch_add(1, Ordering::SeqCst);

        let root = self
            .root
            .read()
            .map_err(|e| StoreError::Unavailable {
                message: format!("failed to acquire read lock: {e}"),
            })?;

        let mut node = &*root;
        for seg in Self::segments(path) {
            match node.get(seg) {
                Some(next) => node = next,
                None => return Ok(None),
            }
        }
        Ok(Some(node.clone()))
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        self.check_online()?;

        let mut root = self
            .root
            .write()
            .map_err(|e| StoreError::Unavailable {
                message: format!("failed to acquire write lock: {e}"),
            })?;

        let segments = Self::segments(path);
        if segments.is_empty() {
            *root = value;
            return Ok(());
        }
        let (parent, key) = Self::descend(&mut root, &segments);
        parent.insert(key, value);
        Ok(())
    }

    async fn update(&self, path: &str, patch: Map<String, Value>) -> Result<(), StoreError> {
        self.check_online()?;

        let mut root = self
            .root
            .write()
            .map_err(|e| StoreError::Unavailable {
                message: format!("failed to acquire write lock: {e}"),
            })?;

        let segments = Self::segments(path);
        if segments.is_empty() {
            return Err(StoreError::Decode {
                path: path.to_string(),
                message: "cannot merge into the store root".to_string(),
            });
        }
        let (parent, key) = Self::descend(&mut root, &segments);
        let target = parent
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()));
        if !target.is_object() {
            *target = Value::Object(Map::new());
        }
        let target = target.as_object_mut().expect("just ensured object");
        for (k, v) in patch {
            target.insert(k, v);
        }
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        self.check_online()?;

        let mut root = self
            .root
            .write()
            .map_err(|e| StoreError::Unavailable {
                message: format!("failed to acquire write lock: {e}"),
            })?;

        let segments = Self::segments(path);
        let Some((last, parents)) = segments.split_last() else {
            *root = Value::Object(Map::new());
            return Ok(());
        };

        let mut node = &mut *root;
        for seg in parents {
            match node.get_mut(seg) {
                Some(next) => node = next,
                None => return Ok(()),
            }
        }
        if let Some(map) = node.as_object_mut() {
            map.remove(*last);
        }
        Ok(())
    }

    async fn push(&self, path: &str, value: Value) -> Result<String, StoreError> {
        let key = Uuid::new_v4().to_string();
        self.set(&format!("{path}/{key}"), value).await?;
        Ok(key)
    }
}
