//! In-process cache service.
//!
//! A single map behind a single mutex. The registry builds it once, so every
//! caller shares the same map.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Keyed cache of JSON values shared across the process.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait CacheService: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;

    /// Insert or replace, returning the previous value.
    fn set(&self, key: &str, value: Value) -> Option<Value>;

    fn remove(&self, key: &str) -> Option<Value>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&self);
}

#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, Value>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Value>> {
        // Poisoning is recovered; every critical section is a single map call.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CacheService for InMemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> Option<Value> {
        self.entries().insert(key.to_string(), value)
    }

    fn remove(&self, key: &str) -> Option<Value> {
        self.entries().remove(key)
    }

    fn len(&self) -> usize {
        self.entries().len()
    }

    fn clear(&self) {
        self.entries().clear();
    }
}
