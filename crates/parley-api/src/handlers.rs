//! Route handler functions.
//!
//! `chat` runs one exchange through the engine and always answers 200 with
//! an `EngineResult`; the engine degrades internally, it never errors. A
//! non-200 only happens when axum rejects a malformed body.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use parley_engine::{EngineResult, InputMethod};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
    #[serde(default)]
    pub input_method: InputMethod,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// POST /chat
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<EngineResult>, ApiError> {
    if req.session_id.trim().is_empty() {
        return Err(ApiError::BadRequest("sessionId must not be empty".to_string()));
    }

    let result = state
        .engine
        .process_message(&req.message, &req.session_id, req.input_method)
        .await;
    Ok(Json(result))
}

/// GET /health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}
