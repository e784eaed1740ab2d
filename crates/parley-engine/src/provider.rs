//! LLM generation provider seam.
//!
//! The engine only depends on the [`LlmProvider`] trait; a concrete Gemini
//! client ships here, and tests substitute scripted fakes. Provider failures
//! are degrade signals, never user-visible errors.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// Errors a provider call may surface.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("provider call timed out")]
    Timeout,
    #[error("provider not configured or unreachable")]
    Unavailable,
    #[error("provider API error: {0}")]
    Api(String),
}

/// A text completion backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Complete a prompt. Implementations must bound their own network I/O;
    /// the returned text is used verbatim as the reply.
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ProviderError>;
}

/// Google AI Studio (Gemini) `generateContent` client.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GeminiProvider {
    const DEFAULT_BASE_URL: &'static str =
        "https://generativelanguage.googleapis.com/v1beta/models";

    /// Build a provider. Returns `None` when the API key is empty, so the
    /// caller can leave the LLM stage unconfigured rather than guaranteed
    /// to fail.
    pub fn new(api_key: String, model: String, timeout: Duration) -> Option<Self> {
        if api_key.is_empty() {
            return None;
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .ok()?;
        Some(Self {
            client,
            api_key,
            model,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different endpoint (test servers).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String, ProviderError> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": temperature,
                "topK": 40,
                "topP": 0.95,
                "maxOutputTokens": max_tokens,
            }
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout
                } else if e.is_connect() {
                    ProviderError::Unavailable
                } else {
                    ProviderError::Api(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Api(format!("HTTP {}", status)));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Api(format!("malformed response: {}", e)))?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ProviderError::Api("no candidate text in response".to_string()))?;

        debug!(chars = text.len(), "LLM completion received");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_key_means_unconfigured() {
        let provider = GeminiProvider::new(
            String::new(),
            "gemini-1.5-flash".to_string(),
            Duration::from_secs(10),
        );
        assert!(provider.is_none());
    }

    #[test]
    fn test_provider_built_with_key() {
        let provider = GeminiProvider::new(
            "test-key".to_string(),
            "gemini-1.5-flash".to_string(),
            Duration::from_secs(10),
        );
        assert!(provider.is_some());
    }

    #[test]
    fn test_response_parsing() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "  Bonjour !  "}]}}
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.candidates[0].content.parts[0].text.trim(), "Bonjour !");
    }

    #[test]
    fn test_response_parsing_empty_candidates() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.candidates.is_empty());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(ProviderError::Timeout.to_string(), "provider call timed out");
        assert_eq!(
            ProviderError::Api("HTTP 429".to_string()).to_string(),
            "provider API error: HTTP 429"
        );
    }
}
