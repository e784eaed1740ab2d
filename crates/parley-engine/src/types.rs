//! Engine-facing types: messages, replies, and the result contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parley_core::types::{Language, Sender};

/// How the user delivered the utterance. Voice transcription happens
/// upstream; the engine only records the channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMethod {
    #[default]
    Text,
    Voice,
}

/// Which stage of the generation chain produced a reply.
///
/// Confidence is a property of the stage, not a calibrated probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    /// LLM stage succeeded.
    Llm,
    /// Context-template stage with retrieved knowledge.
    KnowledgeBase,
    /// Canned intent reply; no knowledge context was available.
    Fallback,
    /// Static emergency paragraph; everything upstream failed.
    EmergencyFallback,
}

impl ResponseSource {
    /// Fixed confidence each stage reports, split on whether knowledge
    /// context backed the reply.
    pub fn confidence(&self, had_context: bool) -> f32 {
        match (self, had_context) {
            (ResponseSource::Llm, true) => 0.95,
            (ResponseSource::Llm, false) => 0.85,
            (ResponseSource::KnowledgeBase, _) => 0.9,
            (ResponseSource::Fallback, _) => 0.7,
            (ResponseSource::EmergencyFallback, _) => 0.5,
        }
    }
}

/// One persisted conversation message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub content: String,
    pub language: Language,
    pub timestamp: DateTime<Utc>,
    /// Provenance: intent on user messages, source and retrieved titles on
    /// bot messages.
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Message {
    pub fn new(sender: Sender, content: impl Into<String>, language: Language) -> Self {
        Self {
            sender,
            content: content.into(),
            language,
            timestamp: Utc::now(),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Output of a single generation chain run, before persistence.
#[derive(Debug, Clone)]
pub struct GeneratedReply {
    pub text: String,
    pub source: ResponseSource,
    pub confidence: f32,
}

/// The output contract of `process_message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineResult {
    pub response: String,
    pub conversation_id: String,
    pub language: Language,
    pub source: ResponseSource,
    pub confidence: f32,
    pub retrieved_titles: Vec<String>,
}
