use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::llm_client::MODEL;
use crate::state::AppState;

/// GET /
/// Lists the public endpoints.
pub async fn index_handler() -> Json<Value> {
    Json(json!({
        "message": "Cardwise credit card recommendation API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "/start": "Start a new conversation (sequential questions)",
            "/chat": "Send a message to the agent (sequential questions)",
            "/submit-profile": "Submit complete profile and get recommendations in one call",
            "/status/{session_id}": "Get conversation status",
            "/session/{session_id}": "Delete a conversation session",
            "/session/{session_id}/reset": "Restart a conversation from the first question"
        }
    }))
}

/// GET /health
/// Reports readiness of the catalog and the language model.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let llm = if state.engine.is_ready() {
        "available"
    } else {
        "not_configured"
    };

    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "cardwise-api",
        "components": {
            "catalog": { "cards": state.engine.catalog_size() },
            "llm": llm,
            "model": MODEL,
            "active_sessions": state.sessions.count().await
        }
    }))
}
