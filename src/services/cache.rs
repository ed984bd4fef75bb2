//! Key-value cache capability.
//!
//! Models the client-side persistent store (localStorage in the web shell):
//! plain string keys and values, no expiry. The tier policy and the
//! remembered sharing preference both live behind this seam.

use dashmap::DashMap;
use std::sync::Arc;

/// Simple string key/value store.
pub trait KeyValueCache: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory cache backed by a concurrent map.
#[derive(Default)]
pub struct MemoryCache {
    entries: DashMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convenience constructor for shared use.
    pub fn shared() -> Arc<dyn KeyValueCache> {
        Arc::new(Self::new())
    }
}

impl KeyValueCache for MemoryCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|v| v.value().clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_cache_roundtrip() {
        let cache = MemoryCache::new();
        assert!(cache.get("premium_alex@example.com").is_none());

        cache.set("premium_alex@example.com", "true");
        assert_eq!(
            cache.get("premium_alex@example.com").as_deref(),
            Some("true")
        );

        cache.remove("premium_alex@example.com");
        assert!(cache.get("premium_alex@example.com").is_none());
    }
}
