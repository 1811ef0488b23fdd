//! Query result cache keyed by query text
//!
//! Holds serialized results of queries whose inputs are fixed (metrics,
//! canned insights). Entries live until `invalidate` is called, which the
//! log-entry path does after every successful insert. Recency-sensitive
//! reads (recent stops, quick search) never go through here.
//!
//! Every invalidation bumps a generation number. A load that started in an
//! older generation returns its result to the caller but never stores it.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, Arc<serde_json::Value>>,
    generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct QueryCache {
    inner: Arc<RwLock<CacheInner>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Arc<serde_json::Value>> {
        self.inner.read().entries.get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, value: serde_json::Value) -> Arc<serde_json::Value> {
        let value = Arc::new(value);
        self.inner.write().entries.insert(key.into(), value.clone());
        value
    }

    pub fn generation(&self) -> u64 {
        self.inner.read().generation
    }

    /// Return the cached value for `key`, or run `load` and store its result.
    ///
    /// The lock is never held across `load`; two concurrent misses both run
    /// the query and the later insert wins. A result is dropped instead of
    /// stored when `invalidate` ran while it was loading.
    pub async fn get_or_try_insert<F, Fut, E>(&self, key: &str, load: F) -> Result<Arc<serde_json::Value>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<serde_json::Value, E>>,
    {
        let started = {
            let inner = self.inner.read();
            if let Some(hit) = inner.entries.get(key) {
                tracing::trace!("Query cache hit");
                return Ok(hit.clone());
            }
            inner.generation
        };

        let value = Arc::new(load().await?);

        let mut inner = self.inner.write();
        if inner.generation == started {
            inner.entries.insert(key.to_string(), value.clone());
        } else {
            tracing::debug!("Discarding query result loaded before invalidation");
        }
        Ok(value)
    }

    pub fn invalidate(&self) {
        let mut inner = self.inner.write();
        if !inner.entries.is_empty() {
            tracing::debug!("Invalidating {} cached queries", inner.entries.len());
        }
        inner.entries.clear();
        inner.generation += 1;
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }
}
