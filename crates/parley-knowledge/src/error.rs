//! Error type for the knowledge subsystem.

use parley_core::error::ParleyError;

/// Errors from knowledge stores and the retriever.
///
/// Callers treat any of these as "no knowledge available" and degrade;
/// a failed fetch is never fatal to a conversation turn.
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("knowledge store unavailable: {0}")]
    Unavailable(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<KnowledgeError> for ParleyError {
    fn from(err: KnowledgeError) -> Self {
        ParleyError::Knowledge(err.to_string())
    }
}
