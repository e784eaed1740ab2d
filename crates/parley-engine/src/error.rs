//! Internal error taxonomy for the conversation engine.
//!
//! Nothing here ever reaches a caller of `process_message`: each variant is
//! caught at its origin and converted into a degrade-to-next-stage signal.

use parley_core::error::ParleyError;
use parley_knowledge::KnowledgeError;

use crate::provider::ProviderError;

/// Errors raised by engine subsystems.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("knowledge store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("LLM provider timed out")]
    ProviderTimeout,
    #[error("LLM provider error: {0}")]
    Provider(String),
    #[error("history write failed: {0}")]
    PersistenceFailure(String),
}

impl From<KnowledgeError> for EngineError {
    fn from(err: KnowledgeError) -> Self {
        EngineError::StoreUnavailable(err.to_string())
    }
}

impl From<ProviderError> for EngineError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Timeout => EngineError::ProviderTimeout,
            other => EngineError::Provider(other.to_string()),
        }
    }
}

impl From<EngineError> for ParleyError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::StoreUnavailable(msg) => ParleyError::Knowledge(msg),
            EngineError::ProviderTimeout => {
                ParleyError::Provider("provider timed out".to_string())
            }
            EngineError::Provider(msg) => ParleyError::Provider(msg),
            EngineError::PersistenceFailure(msg) => ParleyError::Persistence(msg),
        }
    }
}
