//! Process-wide corpus registry
//!
//! Maps seed URLs to their built indexes. Lookups clone an `Arc`, so a chat
//! request keeps answering against the index it found even if a concurrent
//! re-crawl replaces the entry mid-flight. Per-URL build guards serialize
//! crawls of the same site so the slower of two racing builds cannot
//! clobber the faster one after the fact.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::index::CorpusIndex;

/// Registry of built corpus indexes, keyed by seed URL
#[derive(Default)]
pub struct CorpusRegistry {
    stores: RwLock<HashMap<String, Arc<CorpusIndex>>>,
    build_guards: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl CorpusRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the index for a seed URL
    pub async fn put(&self, url: String, index: CorpusIndex) {
        let mut stores = self.stores.write().await;
        if stores.insert(url.clone(), Arc::new(index)).is_some() {
            tracing::info!("Replaced existing index for {}", url);
        }
    }

    /// Looks up the index for a seed URL
    pub async fn get(&self, url: &str) -> Option<Arc<CorpusIndex>> {
        self.stores.read().await.get(url).cloned()
    }

    /// Removes the index for a seed URL, returning whether one existed
    pub async fn remove(&self, url: &str) -> bool {
        let removed = self.stores.write().await.remove(url).is_some();
        if removed {
            self.build_guards.lock().await.remove(url);
        }
        removed
    }

    /// Number of registered corpora
    pub async fn len(&self) -> usize {
        self.stores.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.stores.read().await.is_empty()
    }

    /// Returns the build guard for a seed URL, creating it on first use
    ///
    /// Callers hold the guard's lock across crawl-and-index so concurrent
    /// builds of the same URL run one at a time. Different URLs never
    /// contend.
    pub async fn build_guard(&self, url: &str) -> Arc<Mutex<()>> {
        let mut guards = self.build_guards.lock().await;
        guards
            .entry(url.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
