//! Shared Data Model Handle
//!
//! The data model is a single mutable JSON tree shared by every evaluation
//! and every action write. `DataModel` is a cheap, cloneable handle to it.
//! Clones observe each other's writes; nothing is copied, versioned or
//! serialized between writers.

use crate::data::path::{get_by_path, set_by_path};
use serde_json::{Map, Value};
use std::sync::{Arc, PoisonError, RwLock};

/// Cloneable handle to the shared JSON data tree
#[derive(Debug, Clone)]
pub struct DataModel {
    inner: Arc<RwLock<Value>>,
}

impl Default for DataModel {
    fn default() -> Self {
        Self::new(Value::Object(Map::new()))
    }
}

impl DataModel {
    /// Wrap an initial JSON tree
    pub fn new(initial: Value) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    /// Run `f` against the current tree without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&Value) -> R) -> R {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run `f` with mutable access to the tree
    pub fn update<R>(&self, f: impl FnOnce(&mut Value) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Clone of the value at `path`, or `None` when absent
    pub fn get(&self, path: &str) -> Option<Value> {
        self.read(|model| get_by_path(model, path).cloned())
    }

    /// Write `value` at `path` (see [`set_by_path`] for container rules)
    pub fn set(&self, path: &str, value: Value) {
        self.update(|model| set_by_path(model, path, value));
    }

    /// Full copy of the current tree
    pub fn snapshot(&self) -> Value {
        self.read(Value::clone)
    }
}
