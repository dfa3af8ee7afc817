use crate::services::logger::Logger;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Session cache of raw (unfiltered) result sets keyed by normalized term.
/// Entries are never evicted; the cache lives and dies with its engine.
#[derive(Clone)]
pub struct TermCache {
    logger: Logger,
    entries: Arc<Mutex<HashMap<String, Vec<Value>>>>,
    stats: Arc<Mutex<CacheStats>>,
}

#[derive(Default)]
struct CacheStats {
    hits: u64,
    misses: u64,
    writes: u64,
}

pub fn cache_key(term: &str) -> String {
    term.to_lowercase().replace(' ', "-")
}

impl TermCache {
    pub fn new(logger: Logger) -> Self {
        Self {
            logger: logger.child("cache"),
            entries: Arc::new(Mutex::new(HashMap::new())),
            stats: Arc::new(Mutex::new(CacheStats::default())),
        }
    }

    pub fn get(&self, term: &str) -> Option<Vec<Value>> {
        let key = cache_key(term);
        let entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
        let found = entries.get(&key).cloned();
        let mut stats = self.stats.lock().unwrap_or_else(|err| err.into_inner());
        if found.is_some() {
            stats.hits += 1;
            self.logger
                .debug("Cache hit", Some(&serde_json::json!({ "key": key })));
        } else {
            stats.misses += 1;
        }
        found
    }

    pub fn put(&self, term: &str, data: Vec<Value>) {
        let key = cache_key(term);
        let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
        entries.insert(key, data);
        let mut stats = self.stats.lock().unwrap_or_else(|err| err.into_inner());
        stats.writes += 1;
    }

    pub fn stats(&self) -> Value {
        let entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
        let stats = self.stats.lock().unwrap_or_else(|err| err.into_inner());
        serde_json::json!({
            "entries": entries.len(),
            "hits": stats.hits,
            "misses": stats.misses,
            "writes": stats.writes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{cache_key, TermCache};
    use crate::services::logger::Logger;
    use serde_json::{json, Value};

    #[test]
    fn cache_key_is_case_and_space_insensitive() {
        assert_eq!(cache_key("New York"), "new-york");
        assert_eq!(cache_key("NEW YORK"), "new-york");
        assert_eq!(cache_key("new-york"), "new-york");
        assert_eq!(cache_key(&cache_key("New York")), "new-york");
    }

    #[test]
    fn get_put_roundtrip_and_stats() {
        let cache = TermCache::new(Logger::new("test"));
        assert!(cache.get("batman").is_none());

        cache.put("Bat Man", vec![json!({"Title": "Batman"})]);
        let hit = cache.get("bat man").expect("normalized hit");
        assert_eq!(hit.len(), 1);

        let stats = cache.stats();
        assert_eq!(stats.get("entries").and_then(Value::as_u64), Some(1));
        assert_eq!(stats.get("hits").and_then(Value::as_u64), Some(1));
        assert_eq!(stats.get("misses").and_then(Value::as_u64), Some(1));
        assert_eq!(stats.get("writes").and_then(Value::as_u64), Some(1));
    }
}
