//! Knowledge corpus for Parley.
//!
//! Holds the immutable, categorized knowledge entries, the store trait with
//! SQLite and in-memory implementations, a TTL cache decorator, and the
//! lexical retriever that ranks entries for a query.

pub mod cache;
pub mod entry;
pub mod error;
pub mod retriever;
pub mod sqlite;
pub mod store;

pub use cache::CachedKnowledgeStore;
pub use entry::{Category, KnowledgeEntry};
pub use error::KnowledgeError;
pub use retriever::{RetrievalResult, Retriever};
pub use sqlite::SqliteKnowledgeStore;
pub use store::{KnowledgeStore, MemoryKnowledgeStore, UnavailableKnowledgeStore};
