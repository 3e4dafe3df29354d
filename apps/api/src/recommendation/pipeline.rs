//! Recommendation engine: partition → 3× sub-agent (parallel) → merge → rank → assemble.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::info;

use crate::catalog::CardCatalog;
use crate::llm_client::LanguageModel;
use crate::models::profile::UserProfile;
use crate::recommendation::assembler::{assemble_recommendation, Recommendation};
use crate::recommendation::fan_out::run_fan_out;
use crate::recommendation::ranker::rank_candidates;
use crate::recommendation::ModelHandle;

/// The only failure `analyze_and_recommend` reports. Every model-side problem
/// degrades to a fallback result instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Recommendation pipeline is not configured: {0}")]
    Configuration(String),
}

/// Entry point for the dialogue layer. Shared across requests.
#[derive(Clone)]
pub struct RecommendationEngine {
    catalog: Arc<dyn CardCatalog>,
    model: Option<ModelHandle>,
}

impl RecommendationEngine {
    /// `model` is `None` when no provider credentials are configured; the
    /// engine is still constructed so the question flow keeps working.
    pub fn new(
        catalog: Arc<dyn CardCatalog>,
        model: Option<Arc<dyn LanguageModel>>,
        timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            model: model.map(|m| ModelHandle::new(m, timeout)),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    pub fn catalog_size(&self) -> usize {
        self.catalog.get_all_cards().len()
    }

    /// Runs the full pipeline for a read-only profile.
    pub async fn analyze_and_recommend(
        &self,
        profile: &UserProfile,
    ) -> Result<Recommendation, PipelineError> {
        let model = self.model.as_ref().ok_or_else(|| {
            PipelineError::Configuration("no language model is configured".to_string())
        })?;

        let started = Instant::now();
        let cards = self.catalog.get_all_cards();
        info!("Starting recommendation pipeline over {} cards", cards.len());

        let fan_out = run_fan_out(cards, profile, model).await;
        let ranked = rank_candidates(&fan_out.combined, profile, model).await;
        let recommendation = assemble_recommendation(&fan_out, ranked);

        info!(
            "Recommendation pipeline finished in {:?}: {} candidates, {} recommended, fallback={}",
            started.elapsed(),
            recommendation.all_cards_analyzed,
            recommendation.structured_cards.len(),
            recommendation.used_fallback
        );
        Ok(recommendation)
    }
}
