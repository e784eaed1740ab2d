//! Conversational engine for Parley.
//!
//! Detects the language of an utterance, classifies intent, retrieves
//! knowledge context, and generates a reply through a strictly ordered
//! fallback chain, persisting the turn to a conversation store.

pub mod conversation;
pub mod engine;
pub mod error;
pub mod generate;
pub mod intent;
pub mod language;
pub mod provider;
pub mod types;

pub use conversation::{ConversationStore, MemoryConversationStore, SqliteConversationStore};
pub use engine::ConversationEngine;
pub use error::EngineError;
pub use generate::ResponseGenerator;
pub use intent::IntentClassifier;
pub use language::LanguageDetector;
pub use provider::{GeminiProvider, LlmProvider, ProviderError};
pub use types::{EngineResult, GeneratedReply, InputMethod, Message, ResponseSource};
