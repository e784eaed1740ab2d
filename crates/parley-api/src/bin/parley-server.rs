//! Parley server binary - composition root.
//!
//! Ties the crates together into a single executable:
//! 1. Load configuration from TOML
//! 2. Open the SQLite knowledge and conversation stores
//! 3. Wire the engine (detector, classifier, retriever, generator)
//! 4. Start the axum REST API server

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use parley_core::ParleyConfig;
use parley_engine::{
    ConversationEngine, GeminiProvider, IntentClassifier, LanguageDetector, LlmProvider,
    ResponseGenerator, SqliteConversationStore,
};
use parley_knowledge::{CachedKnowledgeStore, KnowledgeStore, Retriever, SqliteKnowledgeStore};

use parley_api::state::AppState;
use parley_api::routes;

/// Expand ~ to home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if data_dir.starts_with("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&data_dir[2..])
    } else {
        PathBuf::from(data_dir)
    }
}

/// Resolve the config file path (PARLEY_CONFIG env, or ~/.parley/config.toml).
fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var("PARLEY_CONFIG") {
        return PathBuf::from(p);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".parley").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting Parley v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let config_file = config_path();
    let config = ParleyConfig::load_or_default(&config_file);
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Storage.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    std::fs::create_dir_all(&data_dir)?;

    let knowledge = SqliteKnowledgeStore::new(&data_dir.join("knowledge.db"))?;
    let knowledge: Arc<dyn KnowledgeStore> = Arc::new(CachedKnowledgeStore::new(
        Arc::new(knowledge),
        Duration::from_secs(config.engine.cache_ttl_secs),
    ));

    let conversations = SqliteConversationStore::new(
        &data_dir.join("conversations.db"),
        config.engine.max_history_messages,
    )?;
    tracing::info!(path = %data_dir.display(), "SQLite stores opened");

    // LLM provider: optional; a missing key means the knowledge-template
    // stage answers instead.
    let provider: Option<Arc<dyn LlmProvider>> = if config.llm.enabled {
        let api_key = std::env::var(&config.llm.api_key_env).unwrap_or_default();
        match GeminiProvider::new(
            api_key,
            config.llm.model.clone(),
            Duration::from_secs(config.llm.timeout_secs),
        ) {
            Some(p) => {
                tracing::info!(model = %config.llm.model, "LLM provider configured");
                Some(Arc::new(p))
            }
            None => {
                tracing::warn!(
                    env = %config.llm.api_key_env,
                    "No LLM API key set, running without the LLM stage"
                );
                None
            }
        }
    } else {
        tracing::info!("LLM stage disabled in config");
        None
    };

    // Engine.
    let engine = ConversationEngine::new(
        LanguageDetector::new(config.engine.default_language),
        IntentClassifier::new(),
        Retriever::new(knowledge, config.engine.top_n),
        ResponseGenerator::new(
            provider,
            Duration::from_secs(config.llm.timeout_secs),
            config.llm.max_tokens,
            config.llm.temperature,
            config.engine.context_turns,
        ),
        Arc::new(conversations),
        Duration::from_secs(config.engine.retrieval_timeout_secs),
        Duration::from_secs(config.engine.persistence_timeout_secs),
    );

    // API server.
    let port = std::env::var("PARLEY_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(config.server.port);

    routes::start_server(port, AppState::new(engine)).await?;

    Ok(())
}
