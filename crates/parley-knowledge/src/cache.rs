//! TTL cache decorator over a knowledge store.
//!
//! The corpus is read-only at runtime and small, so a per-language snapshot
//! with a TTL keeps retrieval off the backing source for most turns. The
//! ingestion collaborator calls [`CachedKnowledgeStore::invalidate`] after
//! out-of-band writes; there is no refresh timer that could race with reads.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::debug;

use parley_core::types::Language;

use crate::entry::KnowledgeEntry;
use crate::error::KnowledgeError;
use crate::store::KnowledgeStore;

struct CacheSlot {
    fetched_at: Instant,
    entries: Vec<KnowledgeEntry>,
}

/// Caching decorator; implements [`KnowledgeStore`] itself so callers are
/// oblivious to whether a store is cached.
pub struct CachedKnowledgeStore {
    inner: Arc<dyn KnowledgeStore>,
    ttl: Duration,
    slots: Mutex<HashMap<Language, CacheSlot>>,
}

impl CachedKnowledgeStore {
    pub fn new(inner: Arc<dyn KnowledgeStore>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Drop all cached snapshots. The next query refetches.
    pub fn invalidate(&self) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.clear();
            debug!("Knowledge cache invalidated");
        }
    }

    fn cached(&self, language: Language) -> Option<Vec<KnowledgeEntry>> {
        let slots = self.slots.lock().ok()?;
        let slot = slots.get(&language)?;
        if slot.fetched_at.elapsed() < self.ttl {
            Some(slot.entries.clone())
        } else {
            None
        }
    }

    fn fill(&self, language: Language, entries: &[KnowledgeEntry]) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.insert(
                language,
                CacheSlot {
                    fetched_at: Instant::now(),
                    entries: entries.to_vec(),
                },
            );
        }
    }
}

#[async_trait]
impl KnowledgeStore for CachedKnowledgeStore {
    async fn query(&self, language: Language) -> Result<Vec<KnowledgeEntry>, KnowledgeError> {
        if let Some(entries) = self.cached(language) {
            return Ok(entries);
        }
        // Stale or absent; refetch. A failed fetch is not cached, so the
        // next call retries the backing source.
        let entries = self.inner.query(language).await?;
        self.fill(language, &entries);
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Category;
    use crate::store::MemoryKnowledgeStore;

    fn entry(title: &str) -> KnowledgeEntry {
        KnowledgeEntry::new(title, "content", Category::Faq, Language::En, &["kw"])
    }

    #[tokio::test]
    async fn test_serves_from_cache_within_ttl() {
        let inner = Arc::new(MemoryKnowledgeStore::new());
        inner.insert(entry("original"));
        let cached = CachedKnowledgeStore::new(inner.clone(), Duration::from_secs(60));

        assert_eq!(cached.query(Language::En).await.unwrap().len(), 1);

        // A write behind the cache is invisible until invalidation.
        inner.insert(entry("added later"));
        assert_eq!(cached.query(Language::En).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let inner = Arc::new(MemoryKnowledgeStore::new());
        inner.insert(entry("original"));
        let cached = CachedKnowledgeStore::new(inner.clone(), Duration::from_secs(60));

        cached.query(Language::En).await.unwrap();
        inner.insert(entry("added later"));
        cached.invalidate();

        assert_eq!(cached.query(Language::En).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_refetches() {
        let inner = Arc::new(MemoryKnowledgeStore::new());
        inner.insert(entry("original"));
        let cached = CachedKnowledgeStore::new(inner.clone(), Duration::ZERO);

        cached.query(Language::En).await.unwrap();
        inner.insert(entry("added later"));
        assert_eq!(cached.query(Language::En).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_languages_cached_independently() {
        let inner = Arc::new(MemoryKnowledgeStore::new());
        inner.insert(entry("en entry"));
        let cached = CachedKnowledgeStore::new(inner.clone(), Duration::from_secs(60));

        assert_eq!(cached.query(Language::En).await.unwrap().len(), 1);
        assert!(cached.query(Language::Fr).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_fetch_not_cached() {
        use crate::store::UnavailableKnowledgeStore;

        let cached = CachedKnowledgeStore::new(
            Arc::new(UnavailableKnowledgeStore),
            Duration::from_secs(60),
        );
        assert!(cached.query(Language::En).await.is_err());
        // Still errors rather than serving a phantom empty snapshot.
        assert!(cached.query(Language::En).await.is_err());
    }
}
