//! The conversation orchestrator.
//!
//! `process_message` runs the full pipeline: detect language, classify
//! intent, retrieve knowledge, generate a reply, persist the turn. The
//! pipeline never surfaces an error to the caller; every subsystem failure
//! degrades to a weaker reply or a logged skip.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tracing::{debug, info, warn};

use parley_core::types::Sender;
use parley_knowledge::{RetrievalResult, Retriever};

use crate::conversation::ConversationStore;
use crate::generate::ResponseGenerator;
use crate::intent::IntentClassifier;
use crate::language::LanguageDetector;
use crate::types::{EngineResult, InputMethod, Message};

/// Orchestrates one conversational exchange end to end.
///
/// All collaborators are constructor-injected so tests can substitute fakes
/// without global state.
pub struct ConversationEngine {
    detector: LanguageDetector,
    classifier: IntentClassifier,
    retriever: Retriever,
    generator: ResponseGenerator,
    conversations: Arc<dyn ConversationStore>,
    retrieval_timeout: Duration,
    persistence_timeout: Duration,
}

impl ConversationEngine {
    pub fn new(
        detector: LanguageDetector,
        classifier: IntentClassifier,
        retriever: Retriever,
        generator: ResponseGenerator,
        conversations: Arc<dyn ConversationStore>,
        retrieval_timeout: Duration,
        persistence_timeout: Duration,
    ) -> Self {
        Self {
            detector,
            classifier,
            retriever,
            generator,
            conversations,
            retrieval_timeout,
            persistence_timeout,
        }
    }

    /// Process one user message. Infallible: retrieval and persistence
    /// failures degrade, they never propagate.
    pub async fn process_message(
        &self,
        text: &str,
        session_id: &str,
        input_method: InputMethod,
    ) -> EngineResult {
        let language = self.detector.detect(text);
        let intent = self.classifier.classify(text, language);
        debug!(%language, %intent, session = session_id, "classified message");

        let context = self.retrieve_bounded(text, language, intent).await;
        let history = match self.conversations.history(session_id).await {
            Ok(history) => history,
            Err(err) => {
                warn!(error = %err, "history read failed, prompting without history");
                Vec::new()
            }
        };

        let reply = self
            .generator
            .generate(text, language, intent, &context, &history)
            .await;
        let retrieved_titles: Vec<String> =
            context.iter().map(|r| r.entry.title.clone()).collect();

        let user_msg = Message::new(Sender::User, text, language).with_metadata(json!({
            "intent": intent,
            "inputMethod": input_method,
        }));
        let bot_msg = Message::new(Sender::Bot, reply.text.clone(), language).with_metadata(
            json!({
                "source": reply.source,
                "confidence": reply.confidence,
                "retrievedTitles": retrieved_titles,
            }),
        );

        let conversation_id = self.append_bounded(session_id, user_msg, bot_msg).await;

        info!(
            %language,
            %intent,
            source = ?reply.source,
            confidence = reply.confidence,
            "message processed"
        );

        EngineResult {
            response: reply.text,
            conversation_id,
            language,
            source: reply.source,
            confidence: reply.confidence,
            retrieved_titles,
        }
    }

    /// Retrieval bounded by the configured timeout; any failure means "no
    /// knowledge", never an error.
    async fn retrieve_bounded(
        &self,
        text: &str,
        language: parley_core::types::Language,
        intent: parley_core::types::Intent,
    ) -> Vec<RetrievalResult> {
        let call = self.retriever.retrieve(text, language, intent);
        match tokio::time::timeout(self.retrieval_timeout, call).await {
            Ok(Ok(results)) => results,
            Ok(Err(err)) => {
                warn!(error = %err, "retrieval failed, continuing without context");
                Vec::new()
            }
            Err(_) => {
                warn!(timeout = ?self.retrieval_timeout, "retrieval timed out");
                Vec::new()
            }
        }
    }

    /// Persistence bounded by the configured timeout. On failure the session
    /// id stands in for the conversation id so the caller still gets a
    /// stable handle.
    async fn append_bounded(
        &self,
        session_id: &str,
        user_msg: Message,
        bot_msg: Message,
    ) -> String {
        let call = self.conversations.append_turn(session_id, user_msg, bot_msg);
        match tokio::time::timeout(self.persistence_timeout, call).await {
            Ok(Ok(id)) => id.to_string(),
            Ok(Err(err)) => {
                warn!(error = %err, "history write failed, reply returned anyway");
                session_id.to_string()
            }
            Err(_) => {
                warn!(timeout = ?self.persistence_timeout, "history write timed out");
                session_id.to_string()
            }
        }
    }
}
