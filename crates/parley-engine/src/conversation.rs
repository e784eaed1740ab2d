//! Conversation history persistence.
//!
//! A session id is the caller's opaque handle; the store mints a stable
//! conversation UUID on first append and keeps at most a configured number
//! of messages per conversation, dropping oldest first.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rusqlite::Connection;
use tracing::info;
use uuid::Uuid;

use parley_core::types::{Language, Sender};

use crate::error::EngineError;
use crate::types::Message;

/// Durable conversation history.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Append one user/bot turn to the session's conversation, creating the
    /// conversation on first use. Returns the conversation id, stable across
    /// calls for the same session.
    async fn append_turn(
        &self,
        session_id: &str,
        user_msg: Message,
        bot_msg: Message,
    ) -> Result<Uuid, EngineError>;

    /// Full capped history in chronological order. Unknown sessions yield an
    /// empty history, not an error.
    async fn history(&self, session_id: &str) -> Result<Vec<Message>, EngineError>;
}

// ---- In-memory implementation ----

struct SessionRecord {
    id: Uuid,
    messages: Vec<Message>,
}

/// Process-local conversation store for tests and ephemeral deployments.
pub struct MemoryConversationStore {
    sessions: Mutex<HashMap<String, SessionRecord>>,
    max_messages: usize,
}

impl MemoryConversationStore {
    pub fn new(max_messages: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_messages,
        }
    }
}

#[async_trait]
impl ConversationStore for MemoryConversationStore {
    async fn append_turn(
        &self,
        session_id: &str,
        user_msg: Message,
        bot_msg: Message,
    ) -> Result<Uuid, EngineError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|e| EngineError::PersistenceFailure(format!("lock poisoned: {}", e)))?;

        let record = sessions
            .entry(session_id.to_string())
            .or_insert_with(|| SessionRecord {
                id: Uuid::new_v4(),
                messages: Vec::new(),
            });

        record.messages.push(user_msg);
        record.messages.push(bot_msg);
        while record.messages.len() > self.max_messages {
            record.messages.remove(0);
        }

        Ok(record.id)
    }

    async fn history(&self, session_id: &str) -> Result<Vec<Message>, EngineError> {
        let sessions = self
            .sessions
            .lock()
            .map_err(|e| EngineError::PersistenceFailure(format!("lock poisoned: {}", e)))?;
        Ok(sessions
            .get(session_id)
            .map(|r| r.messages.clone())
            .unwrap_or_default())
    }
}

// ---- SQLite implementation ----

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS conversations (
    id          TEXT PRIMARY KEY,
    session_id  TEXT NOT NULL UNIQUE,
    created_at  INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS messages (
    rowid            INTEGER PRIMARY KEY AUTOINCREMENT,
    conversation_id  TEXT NOT NULL REFERENCES conversations(id) ON DELETE CASCADE,
    sender           TEXT NOT NULL,
    content          TEXT NOT NULL,
    language         TEXT NOT NULL,
    created_at       INTEGER NOT NULL,
    metadata         TEXT
);
CREATE INDEX IF NOT EXISTS idx_messages_conversation
    ON messages(conversation_id, rowid);
";

/// SQLite-backed conversation store.
pub struct SqliteConversationStore {
    conn: Mutex<Connection>,
    max_messages: usize,
}

impl SqliteConversationStore {
    /// Open (or create) a store at the given path.
    pub fn new(path: &Path, max_messages: usize) -> Result<Self, EngineError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EngineError::PersistenceFailure(e.to_string()))?;
        }
        let conn = Connection::open(path).map_err(|e| {
            EngineError::PersistenceFailure(format!("failed to open database: {}", e))
        })?;
        let store = Self::init(conn, max_messages)?;
        info!("Conversation store opened at {}", path.display());
        Ok(store)
    }

    /// Open an in-memory store (for testing).
    pub fn in_memory(max_messages: usize) -> Result<Self, EngineError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            EngineError::PersistenceFailure(format!("failed to open in-memory db: {}", e))
        })?;
        Self::init(conn, max_messages)
    }

    fn init(conn: Connection, max_messages: usize) -> Result<Self, EngineError> {
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA foreign_keys = ON;",
        )
        .map_err(|e| EngineError::PersistenceFailure(format!("failed to set pragmas: {}", e)))?;

        conn.execute_batch(SCHEMA).map_err(|e| {
            EngineError::PersistenceFailure(format!("failed to run migrations: {}", e))
        })?;

        Ok(Self {
            conn: Mutex::new(conn),
            max_messages,
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T, EngineError>
    where
        F: FnOnce(&Connection) -> Result<T, EngineError>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| EngineError::PersistenceFailure(format!("database lock poisoned: {}", e)))?;
        f(&conn)
    }

    fn conversation_id(conn: &Connection, session_id: &str) -> Result<Uuid, EngineError> {
        let existing: Option<String> = conn
            .query_row(
                "SELECT id FROM conversations WHERE session_id = ?1",
                rusqlite::params![session_id],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(EngineError::PersistenceFailure(other.to_string())),
            })?;

        if let Some(id) = existing {
            return Uuid::parse_str(&id)
                .map_err(|e| EngineError::PersistenceFailure(format!("invalid UUID: {}", e)));
        }

        let id = Uuid::new_v4();
        conn.execute(
            "INSERT INTO conversations (id, session_id, created_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![id.to_string(), session_id, Utc::now().timestamp()],
        )
        .map_err(|e| EngineError::PersistenceFailure(format!("session create failed: {}", e)))?;
        Ok(id)
    }

    fn insert_message(conn: &Connection, id: Uuid, msg: &Message) -> Result<(), EngineError> {
        let metadata = if msg.metadata.is_null() {
            None
        } else {
            Some(
                serde_json::to_string(&msg.metadata)
                    .map_err(|e| EngineError::PersistenceFailure(e.to_string()))?,
            )
        };
        conn.execute(
            "INSERT INTO messages (conversation_id, sender, content, language, created_at, metadata)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                id.to_string(),
                msg.sender.as_str(),
                msg.content,
                msg.language.code(),
                msg.timestamp.timestamp(),
                metadata,
            ],
        )
        .map_err(|e| EngineError::PersistenceFailure(format!("message insert failed: {}", e)))?;
        Ok(())
    }

    fn trim(conn: &Connection, id: Uuid, max_messages: usize) -> Result<(), EngineError> {
        conn.execute(
            "DELETE FROM messages
             WHERE conversation_id = ?1
               AND rowid NOT IN (
                   SELECT rowid FROM messages
                   WHERE conversation_id = ?1
                   ORDER BY rowid DESC
                   LIMIT ?2
               )",
            rusqlite::params![id.to_string(), max_messages as i64],
        )
        .map_err(|e| EngineError::PersistenceFailure(format!("history trim failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for SqliteConversationStore {
    async fn append_turn(
        &self,
        session_id: &str,
        user_msg: Message,
        bot_msg: Message,
    ) -> Result<Uuid, EngineError> {
        self.with_conn(|conn| {
            let id = Self::conversation_id(conn, session_id)?;
            Self::insert_message(conn, id, &user_msg)?;
            Self::insert_message(conn, id, &bot_msg)?;
            Self::trim(conn, id, self.max_messages)?;
            Ok(id)
        })
    }

    async fn history(&self, session_id: &str) -> Result<Vec<Message>, EngineError> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT m.sender, m.content, m.language, m.created_at, m.metadata
                     FROM messages m
                     JOIN conversations c ON c.id = m.conversation_id
                     WHERE c.session_id = ?1
                     ORDER BY m.rowid",
                )
                .map_err(|e| EngineError::PersistenceFailure(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![session_id], |row| {
                    let sender: String = row.get(0)?;
                    let content: String = row.get(1)?;
                    let language: String = row.get(2)?;
                    let created_at: i64 = row.get(3)?;
                    let metadata: Option<String> = row.get(4)?;
                    Ok((sender, content, language, created_at, metadata))
                })
                .map_err(|e| EngineError::PersistenceFailure(e.to_string()))?;

            let mut messages = Vec::new();
            for row in rows {
                let (sender, content, language, created_at, metadata) =
                    row.map_err(|e| EngineError::PersistenceFailure(e.to_string()))?;

                let sender = Sender::from_str(&sender).map_err(EngineError::PersistenceFailure)?;
                let language =
                    Language::from_str(&language).map_err(EngineError::PersistenceFailure)?;
                let timestamp = Utc
                    .timestamp_opt(created_at, 0)
                    .single()
                    .ok_or_else(|| {
                        EngineError::PersistenceFailure(format!(
                            "invalid timestamp: {}",
                            created_at
                        ))
                    })?;
                let metadata = match metadata {
                    Some(raw) => serde_json::from_str(&raw)
                        .map_err(|e| EngineError::PersistenceFailure(e.to_string()))?,
                    None => serde_json::Value::Null,
                };

                messages.push(Message {
                    sender,
                    content,
                    language,
                    timestamp,
                    metadata,
                });
            }
            Ok(messages)
        })
    }
}
