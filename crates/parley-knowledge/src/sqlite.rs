//! SQLite-backed knowledge store.
//!
//! Wraps a single rusqlite Connection in a Mutex for thread-safe access.
//! Configures WAL mode and recommended PRAGMAs on initialization. Reads
//! return entries in rowid order, which is corpus insertion order.

use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::Connection;
use tracing::info;
use uuid::Uuid;

use parley_core::types::Language;

use crate::entry::{Category, KnowledgeEntry};
use crate::error::KnowledgeError;
use crate::store::KnowledgeStore;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS knowledge_entries (
    rowid       INTEGER PRIMARY KEY AUTOINCREMENT,
    id          TEXT NOT NULL UNIQUE,
    title       TEXT NOT NULL,
    content     TEXT NOT NULL,
    category    TEXT NOT NULL,
    language    TEXT NOT NULL,
    keywords    TEXT NOT NULL,
    active      INTEGER NOT NULL DEFAULT 1,
    created_at  INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_knowledge_language
    ON knowledge_entries(language, active);
";

/// Thread-safe SQLite knowledge store.
pub struct SqliteKnowledgeStore {
    conn: Mutex<Connection>,
}

impl SqliteKnowledgeStore {
    /// Open (or create) a store at the given path.
    pub fn new(path: &Path) -> Result<Self, KnowledgeError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| KnowledgeError::Storage(e.to_string()))?;
        }

        let conn = Connection::open(path)
            .map_err(|e| KnowledgeError::Unavailable(format!("failed to open database: {}", e)))?;
        Self::init(conn, Some(path))
    }

    /// Open an in-memory store (for testing).
    pub fn in_memory() -> Result<Self, KnowledgeError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| KnowledgeError::Unavailable(format!("failed to open in-memory db: {}", e)))?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<&Path>) -> Result<Self, KnowledgeError> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )
        .map_err(|e| KnowledgeError::Storage(format!("failed to set pragmas: {}", e)))?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| KnowledgeError::Storage(format!("failed to run migrations: {}", e)))?;

        if let Some(path) = path {
            info!("Knowledge store opened at {}", path.display());
        }

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Execute a closure with a reference to the underlying connection.
    fn with_conn<F, T>(&self, f: F) -> Result<T, KnowledgeError>
    where
        F: FnOnce(&Connection) -> Result<T, KnowledgeError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| KnowledgeError::Storage(format!("database lock poisoned: {}", e)))?;
        f(&conn)
    }

    /// Insert an entry. Used by the ingestion collaborator, not the engine.
    pub fn insert(&self, entry: &KnowledgeEntry) -> Result<(), KnowledgeError> {
        let keywords = serde_json::to_string(&entry.keywords)
            .map_err(|e| KnowledgeError::Storage(e.to_string()))?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO knowledge_entries
                     (id, title, content, category, language, keywords, active, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    entry.id.to_string(),
                    entry.title,
                    entry.content,
                    entry.category.as_str(),
                    entry.language.code(),
                    keywords,
                    entry.active as i64,
                    chrono::Utc::now().timestamp(),
                ],
            )
            .map_err(|e| KnowledgeError::Storage(format!("insert failed: {}", e)))?;
            Ok(())
        })
    }

    /// Mark an entry inactive. Returns whether a row changed.
    pub fn deactivate(&self, id: Uuid) -> Result<bool, KnowledgeError> {
        self.with_conn(|conn| {
            let changed = conn
                .execute(
                    "UPDATE knowledge_entries SET active = 0 WHERE id = ?1",
                    rusqlite::params![id.to_string()],
                )
                .map_err(|e| KnowledgeError::Storage(format!("deactivate failed: {}", e)))?;
            Ok(changed > 0)
        })
    }

    fn query_sync(&self, language: Language) -> Result<Vec<KnowledgeEntry>, KnowledgeError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, title, content, category, language, keywords, active
                     FROM knowledge_entries
                     WHERE language = ?1 AND active = 1
                     ORDER BY rowid",
                )
                .map_err(|e| KnowledgeError::Storage(format!("query prepare failed: {}", e)))?;

            let rows = stmt
                .query_map(rusqlite::params![language.code()], |row| {
                    let id: String = row.get(0)?;
                    let title: String = row.get(1)?;
                    let content: String = row.get(2)?;
                    let category: String = row.get(3)?;
                    let language: String = row.get(4)?;
                    let keywords: String = row.get(5)?;
                    let active: i64 = row.get(6)?;
                    Ok((id, title, content, category, language, keywords, active))
                })
                .map_err(|e| KnowledgeError::Storage(format!("query failed: {}", e)))?;

            let mut entries = Vec::new();
            for row in rows {
                let (id, title, content, category, language, keywords, active) =
                    row.map_err(|e| KnowledgeError::Storage(e.to_string()))?;

                let id = Uuid::parse_str(&id)
                    .map_err(|e| KnowledgeError::Storage(format!("invalid UUID: {}", e)))?;
                let category = Category::from_str(&category)
                    .map_err(KnowledgeError::Storage)?;
                let language = Language::from_str(&language)
                    .map_err(KnowledgeError::Storage)?;
                let keywords: Vec<String> = serde_json::from_str(&keywords)
                    .map_err(|e| KnowledgeError::Storage(format!("invalid keywords: {}", e)))?;

                entries.push(KnowledgeEntry {
                    id,
                    title,
                    content,
                    category,
                    language,
                    keywords,
                    active: active != 0,
                });
            }
            Ok(entries)
        })
    }
}

#[async_trait]
impl KnowledgeStore for SqliteKnowledgeStore {
    async fn query(&self, language: Language) -> Result<Vec<KnowledgeEntry>, KnowledgeError> {
        self.query_sync(language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(title: &str, language: Language, keywords: &[&str]) -> KnowledgeEntry {
        KnowledgeEntry::new(title, "some content", Category::Services, language, keywords)
    }

    #[tokio::test]
    async fn test_insert_and_query() {
        let store = SqliteKnowledgeStore::in_memory().unwrap();
        store.insert(&entry("first", Language::En, &["web"])).unwrap();
        store.insert(&entry("second", Language::En, &["app"])).unwrap();
        store.insert(&entry("autre", Language::Fr, &["site"])).unwrap();

        let en = store.query(Language::En).await.unwrap();
        assert_eq!(en.len(), 2);
        assert_eq!(en[0].title, "first");
        assert_eq!(en[1].title, "second");

        let fr = store.query(Language::Fr).await.unwrap();
        assert_eq!(fr.len(), 1);
        assert_eq!(fr[0].title, "autre");
    }

    #[tokio::test]
    async fn test_keywords_round_trip() {
        let store = SqliteKnowledgeStore::in_memory().unwrap();
        store
            .insert(&entry("kw entry", Language::En, &["WhatsApp", "automation"]))
            .unwrap();
        let entries = store.query(Language::En).await.unwrap();
        assert_eq!(entries[0].keywords, vec!["whatsapp", "automation"]);
    }

    #[tokio::test]
    async fn test_deactivate_hides_entry() {
        let store = SqliteKnowledgeStore::in_memory().unwrap();
        let e = entry("temp", Language::En, &["kw"]);
        let id = e.id;
        store.insert(&e).unwrap();

        assert!(store.deactivate(id).unwrap());
        assert!(store.query(Language::En).await.unwrap().is_empty());
        // Idempotent second call changes nothing.
        assert!(!store.deactivate(Uuid::new_v4()).unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = SqliteKnowledgeStore::in_memory().unwrap();
        let e = entry("dup", Language::En, &["kw"]);
        store.insert(&e).unwrap();
        assert!(store.insert(&e).is_err());
    }

    #[tokio::test]
    async fn test_on_disk_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knowledge.db");
        let store = SqliteKnowledgeStore::new(&path).unwrap();
        store.insert(&entry("persisted", Language::Fr, &["kw"])).unwrap();
        drop(store);

        let reopened = SqliteKnowledgeStore::new(&path).unwrap();
        let entries = reopened.query(Language::Fr).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "persisted");
    }
}
