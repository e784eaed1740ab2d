//! Integration tests for the Parley HTTP API.
//!
//! Each test builds an independent in-memory engine and drives the router
//! directly with tower's `oneshot`, no network involved.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use parley_api::handlers::HealthResponse;
use parley_api::{create_router, AppState};
use parley_core::Language;
use parley_engine::{
    ConversationEngine, IntentClassifier, LanguageDetector, MemoryConversationStore,
    ResponseGenerator,
};
use parley_knowledge::{Category, KnowledgeEntry, MemoryKnowledgeStore, Retriever};

// =============================================================================
// Helpers
// =============================================================================

fn make_state() -> AppState {
    let knowledge = MemoryKnowledgeStore::with_entries(vec![
        KnowledgeEntry::new(
            "WhatsApp automation pricing",
            "WhatsApp automation projects start at 500 EUR.",
            Category::Pricing,
            Language::En,
            &["whatsapp", "pricing"],
        ),
        KnowledgeEntry::new(
            "Nos services",
            "Nous créons des sites web et des applications mobiles.",
            Category::Services,
            Language::Fr,
            &["site", "application"],
        ),
    ]);

    let engine = ConversationEngine::new(
        LanguageDetector::new(Language::Fr),
        IntentClassifier::new(),
        Retriever::new(Arc::new(knowledge), 3),
        ResponseGenerator::new(None, Duration::from_millis(50), 300, 0.7, 3),
        Arc::new(MemoryConversationStore::new(20)),
        Duration::from_millis(200),
        Duration::from_millis(200),
    );
    AppState::new(engine)
}

fn make_app() -> axum::Router {
    create_router(make_state())
}

fn chat_request(json: &str) -> Request<Body> {
    Request::post("/chat")
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// /health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let response = make_app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

// =============================================================================
// /chat
// =============================================================================

#[tokio::test]
async fn test_chat_happy_path() {
    let response = make_app()
        .oneshot(chat_request(
            r#"{"message": "What is the price for WhatsApp automation?", "sessionId": "s1"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["language"], "en");
    assert_eq!(json["source"], "knowledge_base");
    assert_eq!(json["retrievedTitles"][0], "WhatsApp automation pricing");
    assert!(json["response"].as_str().unwrap().contains("500 EUR"));
    assert!(!json["conversationId"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_french_greeting() {
    let response = make_app()
        .oneshot(chat_request(r#"{"message": "Bonjour", "sessionId": "s1"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["language"], "fr");
    assert!(!json["response"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_chat_voice_input_method_accepted() {
    let response = make_app()
        .oneshot(chat_request(
            r#"{"message": "Bonjour", "sessionId": "s1", "inputMethod": "voice"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_chat_conversation_id_stable_within_session() {
    let app = make_app();

    let first = app
        .clone()
        .oneshot(chat_request(r#"{"message": "Bonjour", "sessionId": "same"}"#))
        .await
        .unwrap();
    let first_id = body_json(first).await["conversationId"].clone();

    let second = app
        .oneshot(chat_request(
            r#"{"message": "Combien pour un site web ?", "sessionId": "same"}"#,
        ))
        .await
        .unwrap();
    let second_id = body_json(second).await["conversationId"].clone();

    assert_eq!(first_id, second_id);
}

#[tokio::test]
async fn test_chat_unknown_subject_still_200() {
    // Nothing retrievable: the engine degrades, the API still answers 200.
    let response = make_app()
        .oneshot(chat_request(
            r#"{"message": "tell me about the weather", "sessionId": "s1"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["source"], "emergency_fallback");
    assert!(!json["response"].as_str().unwrap().is_empty());
}

// =============================================================================
// Malformed requests
// =============================================================================

#[tokio::test]
async fn test_chat_invalid_json_rejected() {
    let response = make_app()
        .oneshot(chat_request("{not json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_missing_fields_rejected() {
    let response = make_app()
        .oneshot(chat_request(r#"{"message": "hi"}"#))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_chat_empty_session_id_rejected() {
    let response = make_app()
        .oneshot(chat_request(r#"{"message": "Bonjour", "sessionId": "  "}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"], "bad_request");
}
