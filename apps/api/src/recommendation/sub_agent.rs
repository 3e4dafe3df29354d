//! Sub-Agent Filter — asks the model to keep roughly half of one partition.
//!
//! Any failure (call error, timeout, unparseable output) falls back to the
//! first ⌊n/2⌋ cards of the partition. This function never fails.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{CardRecord, CreditTier};
use crate::llm_client::prompts::{EXACT_NAMES_INSTRUCTION, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{parse_json_response, LlmError};
use crate::models::profile::UserProfile;
use crate::recommendation::prompts::{
    SUB_AGENT_PROMPT_TEMPLATE, SUB_AGENT_STUDENT_INSTRUCTION, SUB_AGENT_SYSTEM,
};
use crate::recommendation::ModelHandle;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Output of one sub-agent run. Produced once, consumed once by the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubAgentResult {
    pub agent_id: String,
    /// Model's return order; duplicates are kept.
    pub selected_cards: Vec<CardRecord>,
    pub cards_analyzed: usize,
    /// Raw model text, or a note describing why the fallback was used.
    pub raw_response: String,
    pub used_fallback: bool,
}

/// One `{name, reasoning}` pick as the model returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct CardSelection {
    pub name: String,
    #[serde(default)]
    pub reasoning: String,
}

/// Condensed per-card view sent to sub-agents. No internal identifiers.
#[derive(Debug, Serialize)]
struct CardBrief<'a> {
    name: &'a str,
    issuer: &'a str,
    annual_fee: f64,
    credit_score_required: CreditTier,
    rewards: &'a str,
    category: &'a str,
    target_audience: &'a str,
}

impl<'a> From<&'a CardRecord> for CardBrief<'a> {
    fn from(card: &'a CardRecord) -> Self {
        Self {
            name: &card.name,
            issuer: &card.issuer,
            annual_fee: card.annual_fee,
            credit_score_required: card.credit_score_required,
            rewards: &card.rewards,
            category: &card.category,
            target_audience: &card.target_audience,
        }
    }
}

pub fn agent_id(agent_index: usize) -> String {
    format!("agent_{agent_index}")
}

// ────────────────────────────────────────────────────────────────────────────
// Filter
// ────────────────────────────────────────────────────────────────────────────

/// Reduces `partition` to the cards the model judges most relevant to `profile`.
pub async fn run_sub_agent(
    agent_index: usize,
    partition: &[CardRecord],
    profile: &UserProfile,
    model: &ModelHandle,
) -> SubAgentResult {
    let agent_id = agent_id(agent_index);

    if partition.is_empty() {
        info!("{} has an empty partition, skipping model call", agent_id);
        return SubAgentResult {
            agent_id,
            selected_cards: Vec::new(),
            cards_analyzed: 0,
            raw_response: String::new(),
            used_fallback: false,
        };
    }

    info!("{} analyzing {} cards", agent_id, partition.len());

    match select_with_model(&agent_id, partition, profile, model).await {
        Ok((selected_cards, raw_response)) => {
            info!(
                "{} selected {} of {} cards",
                agent_id,
                selected_cards.len(),
                partition.len()
            );
            SubAgentResult {
                agent_id,
                selected_cards,
                cards_analyzed: partition.len(),
                raw_response,
                used_fallback: false,
            }
        }
        Err(e) => {
            warn!("{} model selection failed, using fallback: {}", agent_id, e);
            fallback_result(agent_index, partition, format!("Fallback selection: {e}"))
        }
    }
}

/// Deterministic substitute: the first ⌊n/2⌋ cards in partition order.
pub fn fallback_result(agent_index: usize, partition: &[CardRecord], note: String) -> SubAgentResult {
    SubAgentResult {
        agent_id: agent_id(agent_index),
        selected_cards: partition[..partition.len() / 2].to_vec(),
        cards_analyzed: partition.len(),
        raw_response: note,
        used_fallback: true,
    }
}

async fn select_with_model(
    agent_id: &str,
    partition: &[CardRecord],
    profile: &UserProfile,
    model: &ModelHandle,
) -> Result<(Vec<CardRecord>, String), LlmError> {
    let prompt = build_sub_agent_prompt(agent_id, partition, profile)?;
    let system = SUB_AGENT_SYSTEM.replace("{agent_id}", &agent_id.to_uppercase());

    debug!("{} prompt is {} characters", agent_id, prompt.len());
    let raw = model.invoke(&system, &prompt).await?;
    let selections: Vec<CardSelection> = parse_json_response(&raw)?;

    Ok((match_selections(agent_id, &selections, partition), raw))
}

/// Resolves each pick to a partition card by case-insensitive exact name.
/// Names the partition does not contain are dropped.
pub fn match_selections(
    agent_id: &str,
    selections: &[CardSelection],
    partition: &[CardRecord],
) -> Vec<CardRecord> {
    selections
        .iter()
        .filter_map(|selection| {
            let found = partition.iter().find(|c| c.name_matches(&selection.name));
            match found {
                Some(card) => debug!("{} kept '{}': {}", agent_id, card.name, selection.reasoning),
                None => debug!("{} dropped unknown card '{}'", agent_id, selection.name),
            }
            found.cloned()
        })
        .collect()
}

/// User line shared by every stage: goal | credit score | spending | situation.
pub fn user_line(profile: &UserProfile) -> String {
    format!(
        "{} | {} | {} | Credit Situation: {}",
        profile.primary_goal.as_deref().unwrap_or(""),
        profile.credit_score.as_deref().unwrap_or(""),
        profile.monthly_spending.as_deref().unwrap_or(""),
        profile.credit_situation.as_deref().unwrap_or(""),
    )
}

pub fn build_sub_agent_prompt(
    agent_id: &str,
    partition: &[CardRecord],
    profile: &UserProfile,
) -> Result<String, LlmError> {
    let briefs: Vec<CardBrief<'_>> = partition.iter().map(CardBrief::from).collect();
    let cards_json = serde_json::to_string_pretty(&briefs)?;

    let student_instruction = if profile.is_student() {
        SUB_AGENT_STUDENT_INSTRUCTION
    } else {
        ""
    };

    Ok(SUB_AGENT_PROMPT_TEMPLATE
        .replace("{agent_id}", &agent_id.to_uppercase())
        .replace("{card_count}", &partition.len().to_string())
        .replace("{target_count}", &(partition.len() / 2).to_string())
        .replace("{student_instruction}", student_instruction)
        .replace("{exact_names_instruction}", EXACT_NAMES_INSTRUCTION)
        .replace("{json_only_instruction}", JSON_ONLY_INSTRUCTION)
        .replace("{cards_json}", &cards_json)
        // user text goes in last so its braces are never expanded
        .replace("{user_line}", &user_line(profile)))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
