//! The knowledge store seam.
//!
//! The engine only ever reads through [`KnowledgeStore`]; ingestion writes
//! happen out-of-band against the concrete store. Keeping the trait a dumb
//! language projection (no category filtering) leaves all ranking decisions
//! in the retriever where they can be audited.

use std::sync::Mutex;

use async_trait::async_trait;

use parley_core::types::Language;

use crate::entry::KnowledgeEntry;
use crate::error::KnowledgeError;

/// Read seam over the knowledge corpus.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// All active entries for a language, in corpus insertion order.
    ///
    /// Insertion order is the tie-break order for retrieval, so
    /// implementations must preserve it.
    async fn query(&self, language: Language) -> Result<Vec<KnowledgeEntry>, KnowledgeError>;
}

/// In-memory store, used by tests and for seeding demo corpora.
#[derive(Default)]
pub struct MemoryKnowledgeStore {
    entries: Mutex<Vec<KnowledgeEntry>>,
}

impl MemoryKnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with the given entries.
    pub fn with_entries(entries: Vec<KnowledgeEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Append an entry, preserving insertion order.
    pub fn insert(&self, entry: KnowledgeEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry);
        }
    }

    /// Mark an entry inactive by id. Returns whether anything changed.
    pub fn deactivate(&self, id: uuid::Uuid) -> bool {
        let Ok(mut entries) = self.entries.lock() else {
            return false;
        };
        match entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.active = false;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl KnowledgeStore for MemoryKnowledgeStore {
    async fn query(&self, language: Language) -> Result<Vec<KnowledgeEntry>, KnowledgeError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| KnowledgeError::Storage(format!("entries lock poisoned: {}", e)))?;
        Ok(entries
            .iter()
            .filter(|e| e.active && e.language == language)
            .cloned()
            .collect())
    }
}

/// A store that always fails. Exercises degraded paths in tests.
pub struct UnavailableKnowledgeStore;

#[async_trait]
impl KnowledgeStore for UnavailableKnowledgeStore {
    async fn query(&self, _language: Language) -> Result<Vec<KnowledgeEntry>, KnowledgeError> {
        Err(KnowledgeError::Unavailable(
            "backing source unreachable".to_string(),
        ))
    }
}
