use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use serde_json::Value;
use sha1::{Digest, Sha1};

use crate::data::transport::now_ms;

// ============================================================================
// Key-value store with expiry — caches fetched configuration documents
// ============================================================================

#[derive(Debug, Clone)]
struct StoredEntry {
    value: Value,
    /// Absolute deadline in epoch milliseconds; `None` never expires.
    expires_at_ms: Option<u64>,
}

/// Mutex-guarded in-memory store. Expired entries are evicted on read.
#[derive(Default)]
pub struct ConfigStore {
    entries: Mutex<HashMap<String, StoredEntry>>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: &str, value: Value, ttl: Option<Duration>) {
        let expires_at_ms = ttl.map(|ttl| now_ms().saturating_add(ttl.as_millis() as u64));

        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key.to_string(), StoredEntry { value, expires_at_ms });
            }
            Err(e) => eprintln!("Warning: config store lock poisoned: {}", e),
        }
    }

    /// `None` for missing or expired keys.
    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("Warning: config store lock poisoned: {}", e);
                return None;
            }
        };

        let expired = entries
            .get(key)
            .is_some_and(|entry| entry.expires_at_ms.is_some_and(|at| at <= now_ms()));

        if expired {
            entries.remove(key);
            return None;
        }

        entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cache key for one page config fetched from one service endpoint.
pub fn config_cache_key(endpoint: &str, page_code: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(endpoint.as_bytes());
    hasher.update(b"\0");
    hasher.update(page_code.as_bytes());
    format!("page-config:{:x}", hasher.finalize())
}
