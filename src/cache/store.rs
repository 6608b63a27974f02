//! Tag-indexed storage for serialized list payloads.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use bytes::Bytes;
use lru::LruCache;
use metrics::counter;
use tracing::debug;

use super::config::CacheConfig;
use super::keys::{CacheTag, ListKey};
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

struct CacheState {
    entries: LruCache<ListKey, Bytes>,
    // tag -> keys currently registered under it; kept in step with `entries`
    tags: HashMap<CacheTag, HashSet<ListKey>>,
}

/// Cache for serialized paginated list payloads with tag-based bulk
/// invalidation. Entries live until their tag is invalidated or LRU
/// eviction discards them; there is no TTL.
pub struct ListCache {
    state: RwLock<CacheState>,
    enabled: bool,
}

impl ListCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            state: RwLock::new(CacheState {
                entries: LruCache::new(config.list_limit_non_zero()),
                tags: HashMap::new(),
            }),
            enabled: config.enabled,
        }
    }

    /// Return the payload under `key`, computing and storing it on a miss.
    ///
    /// `compute` must be idempotent and side-effect-free beyond reading the
    /// store; its failure propagates unchanged and leaves no entry behind.
    /// A disabled cache degrades every call to a direct compute.
    pub async fn get_or_compute<F, Fut, E>(&self, key: ListKey, compute: F) -> Result<Bytes, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Bytes, E>>,
    {
        if !self.enabled {
            return compute().await;
        }

        if let Some(payload) = self.get(key) {
            counter!("scaffale_list_cache_hit_total").increment(1);
            return Ok(payload);
        }

        counter!("scaffale_list_cache_miss_total").increment(1);
        let payload = compute().await?;
        self.insert(key, payload.clone());
        Ok(payload)
    }

    /// Atomically discard every entry registered under `tag`.
    pub fn invalidate(&self, tag: CacheTag) {
        if !self.enabled {
            return;
        }
        let mut state = rw_write(&self.state, SOURCE, "invalidate");
        let keys = state.tags.remove(&tag).unwrap_or_default();
        let dropped = keys.len();
        for key in keys {
            state.entries.pop(&key);
        }
        if dropped > 0 {
            counter!("scaffale_list_cache_invalidated_total").increment(dropped as u64);
            debug!(
                tag = tag.kind().as_str(),
                dropped, "invalidated cached list pages"
            );
        }
    }

    /// Number of live entries, for tests and diagnostics.
    pub fn len(&self) -> usize {
        rw_read(&self.state, SOURCE, "len").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, key: ListKey) -> Option<Bytes> {
        // LruCache::get mutates recency order, so a write guard is required.
        rw_write(&self.state, SOURCE, "get").entries.get(&key).cloned()
    }

    fn insert(&self, key: ListKey, payload: Bytes) {
        let mut state = rw_write(&self.state, SOURCE, "insert");
        if let Some((evicted, _)) = state.entries.push(key, payload)
            && evicted != key
        {
            // Capacity eviction: unregister the displaced key from its tag.
            if let Some(keys) = state.tags.get_mut(&evicted.tag()) {
                keys.remove(&evicted);
            }
            counter!("scaffale_list_cache_evict_total").increment(1);
        }
        state.tags.entry(key.tag()).or_default().insert(key);
    }
}
