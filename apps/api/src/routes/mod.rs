pub mod health;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::conversation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::index_handler))
        .route("/health", get(health::health_handler))
        // Conversation API
        .route("/start", post(handlers::handle_start))
        .route("/chat", post(handlers::handle_chat))
        .route("/submit-profile", post(handlers::handle_submit_profile))
        .route("/status/:session_id", get(handlers::handle_status))
        .route("/session/:session_id", delete(handlers::handle_delete_session))
        .route("/session/:session_id/reset", post(handlers::handle_reset_session))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::catalog::fixtures::cards;
    use crate::catalog::StaticCatalog;
    use crate::conversation::store::SessionStore;
    use crate::llm_client::LanguageModel;
    use crate::models::profile::ProfileField;
    use crate::recommendation::test_support::ScriptedModel;
    use crate::recommendation::RecommendationEngine;

    fn state_with(model: Option<Arc<dyn LanguageModel>>) -> AppState {
        AppState {
            engine: RecommendationEngine::new(
                Arc::new(StaticCatalog::new(cards(12))),
                model,
                Duration::from_secs(30),
            ),
            sessions: SessionStore::new(),
        }
    }

    fn scripted_state() -> AppState {
        state_with(Some(Arc::new(ScriptedModel::new(cards(12)))))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(match body {
                Some(v) => Body::from(v.to_string()),
                None => Body::empty(),
            })
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn full_profile() -> Value {
        json!({
            "primary_goal": "Cash back",
            "top_spend_category": "Dining",
            "brand_preferences": "Amazon",
            "travel_frequency": "Rarely",
            "monthly_spending": "$1,200",
            "payment_behavior": "Pay in full",
            "income": "$60,000",
            "credit_score": "700-750",
            "credit_situation": "Established credit"
        })
    }

    #[tokio::test]
    async fn test_health_reports_components() {
        let app = build_router(state_with(None));
        let (status, body) = send(&app, Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["components"]["catalog"]["cards"], 12);
        assert_eq!(body["components"]["llm"], "not_configured");
    }

    #[tokio::test]
    async fn test_start_then_chat_walks_the_questions() {
        let app = build_router(scripted_state());

        let (status, start) = send(&app, Method::POST, "/start", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(start["initial_question"], ProfileField::PrimaryGoal.question());
        let session_id = start["session_id"].as_str().unwrap().to_string();

        let (status, reply) = send(
            &app,
            Method::POST,
            "/chat",
            Some(json!({"message": "Travel rewards", "session_id": session_id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["response"], ProfileField::TopSpendCategory.question());
        assert_eq!(reply["current_question"], "top_spend_category");
        assert_eq!(reply["is_complete"], false);

        let (status, info) = send(&app, Method::GET, &format!("/status/{session_id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(info["status"]["questions_completed"], 1);
        assert_eq!(info["current_question"], "top_spend_category");
        assert_eq!(info["conversation_history"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_chat_with_unknown_session_is_not_found() {
        let app = build_router(scripted_state());
        let (status, body) = send(
            &app,
            Method::POST,
            "/chat",
            Some(json!({"message": "hi", "session_id": "nope"})),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_submit_profile_returns_structured_cards() {
        let app = build_router(scripted_state());
        let (status, body) = send(&app, Method::POST, "/submit-profile", Some(full_profile())).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["is_complete"], true);
        assert_eq!(body["structured_cards"].as_array().unwrap().len(), 3);
        assert_eq!(body["structured_cards"][0]["name"], "Test Card 01");
        assert!(body["structured_cards"][0]["reasoning"].is_string());
        assert_eq!(body["conversation_summary"]["questions_completed"], 9);
        assert!(body["session_id"].is_string());
    }

    #[tokio::test]
    async fn test_submit_profile_with_missing_fields_is_rejected() {
        let app = build_router(scripted_state());
        let mut profile = full_profile();
        profile["income"] = json!("");
        profile.as_object_mut().unwrap().remove("credit_score");

        let (status, body) = send(&app, Method::POST, "/submit-profile", Some(profile)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        let message = body["error"]["message"].as_str().unwrap();
        assert!(message.contains("income, credit_score"));
    }

    #[tokio::test]
    async fn test_rejected_profile_leaves_no_session_behind() {
        let state = scripted_state();
        let app = build_router(state.clone());
        let mut profile = full_profile();
        profile["income"] = json!("  ");

        let (status, _) = send(&app, Method::POST, "/submit-profile", Some(profile)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(state.sessions.count().await, 0);
    }

    #[tokio::test]
    async fn test_submit_profile_without_model_is_unavailable() {
        let app = build_router(state_with(None));
        let (status, body) = send(&app, Method::POST, "/submit-profile", Some(full_profile())).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "CONFIGURATION_ERROR");
    }

    #[tokio::test]
    async fn test_delete_session() {
        let app = build_router(scripted_state());
        let (_, start) = send(&app, Method::POST, "/start", None).await;
        let uri = format!("/session/{}", start["session_id"].as_str().unwrap());

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reset_session_starts_over() {
        let app = build_router(scripted_state());
        let (_, start) = send(&app, Method::POST, "/start", None).await;
        let session_id = start["session_id"].as_str().unwrap().to_string();
        send(
            &app,
            Method::POST,
            "/chat",
            Some(json!({"message": "Cash back", "session_id": session_id})),
        )
        .await;

        let (status, body) =
            send(&app, Method::POST, &format!("/session/{session_id}/reset"), None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"]["questions_completed"], 0);
        assert_eq!(body["conversation_history"], json!([]));
    }

    #[tokio::test]
    async fn test_status_for_unknown_session_is_not_found() {
        let app = build_router(scripted_state());
        let uri = format!("/status/{}", uuid::Uuid::new_v4());
        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
