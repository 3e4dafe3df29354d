//! Pure composition of the ranker output with fan-out bookkeeping.

use serde::Serialize;

use crate::recommendation::fan_out::FanOutResult;
use crate::recommendation::parser::RankedCard;
use crate::recommendation::ranker::RankerOutput;

/// Per-agent counts reported alongside the recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubAgentSummary {
    pub agent_id: String,
    pub cards_analyzed: usize,
    pub cards_selected: usize,
    pub used_fallback: bool,
}

/// The pipeline's single return value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub text_response: String,
    pub structured_cards: Vec<RankedCard>,
    /// Size of the combined candidate list handed to the ranker.
    pub all_cards_analyzed: usize,
    pub sub_agent_results: Vec<SubAgentSummary>,
    /// True when the ranker answer came from the deterministic fallback.
    pub used_fallback: bool,
}

pub fn assemble_recommendation(fan_out: &FanOutResult, ranked: RankerOutput) -> Recommendation {
    let sub_agent_results = fan_out
        .agent_results
        .iter()
        .map(|r| SubAgentSummary {
            agent_id: r.agent_id.clone(),
            cards_analyzed: r.cards_analyzed,
            cards_selected: r.selected_cards.len(),
            used_fallback: r.used_fallback,
        })
        .collect();

    Recommendation {
        text_response: ranked.text_response,
        structured_cards: ranked.structured_cards,
        all_cards_analyzed: fan_out.combined.len(),
        sub_agent_results,
        used_fallback: ranked.used_fallback,
    }
}
