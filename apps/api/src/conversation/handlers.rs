use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::conversation::{ChatTurn, ConversationError, ConversationSummary};
use crate::errors::AppError;
use crate::models::profile::{ProfileField, UserProfile};
use crate::recommendation::{RankedCard, Recommendation};
use crate::state::AppState;

#[derive(Serialize)]
pub struct StartResponse {
    pub session_id: Uuid,
    pub initial_question: String,
    pub message: String,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: Uuid,
    pub is_complete: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question: Option<ProfileField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_summary: Option<ConversationSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_cards: Option<Vec<RankedCard>>,
}

#[derive(Deserialize)]
pub struct SubmitProfileRequest {
    pub session_id: Option<String>,
    #[serde(flatten)]
    pub profile: UserProfile,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub session_id: Uuid,
    pub status: ConversationSummary,
    pub current_question: Option<ProfileField>,
    pub conversation_history: Vec<ChatTurn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_recommendation: Option<Recommendation>,
}

fn session_not_found() -> AppError {
    AppError::NotFound("Session not found".to_string())
}

/// POST /start
pub async fn handle_start(State(state): State<AppState>) -> Result<Json<StartResponse>, AppError> {
    let (session_id, session) = state.sessions.create().await;
    let reply = session
        .lock()
        .await
        .process_message(None, &state.engine)
        .await?;

    info!("Started session {session_id}");
    Ok(Json(StartResponse {
        session_id,
        initial_question: reply.response.clone(),
        message: reply.response,
    }))
}

/// POST /chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let raw_id = req.session_id.as_deref().ok_or_else(session_not_found)?;
    let (session_id, session) = state
        .sessions
        .find(raw_id)
        .await
        .ok_or_else(session_not_found)?;

    let mut session = session.lock().await;
    let reply = session
        .process_message(Some(req.message.as_str()), &state.engine)
        .await?;

    Ok(Json(ChatResponse {
        response: reply.response,
        session_id,
        is_complete: reply.is_complete,
        current_question: reply.current_question,
        conversation_summary: None,
        structured_cards: reply.recommendation.map(|r| r.structured_cards),
    }))
}

/// POST /submit-profile
///
/// Uses the given session when it exists, otherwise starts a new one.
pub async fn handle_submit_profile(
    State(state): State<AppState>,
    Json(req): Json<SubmitProfileRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if !req.profile.is_complete() {
        return Err(ConversationError::MissingFields(req.profile.missing_fields()).into());
    }

    let existing = match req.session_id.as_deref() {
        Some(raw_id) => state.sessions.find(raw_id).await,
        None => None,
    };
    let (session_id, session) = match existing {
        Some(found) => found,
        None => state.sessions.create().await,
    };

    let mut session = session.lock().await;
    let reply = session
        .submit_complete_profile(req.profile, &state.engine)
        .await?;
    let summary = session.summary();

    info!(
        "Session {session_id} profile analyzed: {} cards recommended",
        reply
            .recommendation
            .as_ref()
            .map_or(0, |r| r.structured_cards.len())
    );

    Ok(Json(ChatResponse {
        response: reply.response,
        session_id,
        is_complete: reply.is_complete,
        current_question: None,
        conversation_summary: Some(summary),
        structured_cards: Some(
            reply
                .recommendation
                .map(|r| r.structured_cards)
                .unwrap_or_default(),
        ),
    }))
}

/// GET /status/:session_id
pub async fn handle_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    let (session_id, session) = state
        .sessions
        .find(&session_id)
        .await
        .ok_or_else(session_not_found)?;

    let session = session.lock().await;
    Ok(Json(StatusResponse {
        session_id,
        status: session.summary(),
        current_question: session.current_question,
        conversation_history: session.history.clone(),
        last_recommendation: session.analysis.clone(),
    }))
}

/// POST /session/:session_id/reset
pub async fn handle_reset_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    let (session_id, session) = state
        .sessions
        .find(&session_id)
        .await
        .ok_or_else(session_not_found)?;

    let mut session = session.lock().await;
    session.reset();
    info!("Reset session {session_id}");

    Ok(Json(StatusResponse {
        session_id,
        status: session.summary(),
        current_question: session.current_question,
        conversation_history: Vec::new(),
        last_recommendation: None,
    }))
}

/// DELETE /session/:session_id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = Uuid::parse_str(session_id.trim()).map_err(|_| session_not_found())?;
    if !state.sessions.remove(&id).await {
        return Err(session_not_found());
    }

    info!("Deleted session {id}");
    Ok(Json(json!({ "message": "Session deleted successfully" })))
}
