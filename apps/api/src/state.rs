use crate::conversation::store::SessionStore;
use crate::recommendation::RecommendationEngine;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Recommendation pipeline. Its language model is absent when no API key is configured.
    pub engine: RecommendationEngine,
    pub sessions: SessionStore,
}
