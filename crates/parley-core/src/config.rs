use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ParleyError, Result};
use crate::types::Language;

/// Top-level configuration for the Parley engine.
///
/// Loaded from `~/.parley/config.toml` by default. Each section corresponds
/// to a bounded context or cross-cutting concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParleyConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl ParleyConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ParleyConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ParleyError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the SQLite databases.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.parley/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Conversation engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Language to answer in when detection scores tie.
    pub default_language: Language,
    /// Maximum number of messages kept per conversation; oldest dropped first.
    pub max_history_messages: usize,
    /// Number of recent turns embedded into the generation prompt.
    pub context_turns: usize,
    /// Maximum retrieval results passed to the generator.
    pub top_n: usize,
    /// Knowledge retrieval deadline before degrading to the next stage.
    pub retrieval_timeout_secs: u64,
    /// Deadline for best-effort history writes.
    pub persistence_timeout_secs: u64,
    /// Knowledge cache time-to-live.
    pub cache_ttl_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_language: Language::Fr,
            max_history_messages: 20,
            context_turns: 3,
            top_n: 3,
            retrieval_timeout_secs: 4,
            persistence_timeout_secs: 4,
            cache_ttl_secs: 300,
        }
    }
}

/// LLM generation provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Whether the LLM stage is attempted at all.
    pub enabled: bool,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Model identifier sent to the provider.
    pub model: String,
    /// Hard deadline for a single completion call.
    pub timeout_secs: u64,
    /// Maximum output tokens requested per completion.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key_env: "PARLEY_LLM_API_KEY".to_string(),
            model: "gemini-1.5-flash".to_string(),
            timeout_secs: 10,
            max_tokens: 300,
            temperature: 0.7,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port to bind on 127.0.0.1.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3040 }
    }
}
