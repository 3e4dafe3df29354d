//! Final Ranker — asks the model for the top 3 candidates in a fixed template
//! and parses the answer back into catalog-backed records.
//!
//! Failure policy: a failed call or an answer with no parseable blocks falls
//! back to a template built from the first two candidates, which goes through
//! the same extraction so the output shape never depends on the path taken.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::{CardRecord, CreditTier};
use crate::llm_client::prompts::EXACT_NAMES_INSTRUCTION;
use crate::llm_client::LlmError;
use crate::models::profile::UserProfile;
use crate::recommendation::parser::{extract_structured_cards, match_blocks, parse_blocks, RankedCard};
use crate::recommendation::prompts::{
    FALLBACK_INTRO, FALLBACK_OUTRO, NO_MATCH_MESSAGE, RANKER_PROMPT_TEMPLATE,
    RANKER_STUDENT_INSTRUCTION, RANKER_SYSTEM,
};
use crate::recommendation::sub_agent::user_line;
use crate::recommendation::ModelHandle;

/// Number of candidates the deterministic fallback recommends.
const FALLBACK_CARD_COUNT: usize = 2;

/// What the ranker hands to the assembler.
#[derive(Debug, Clone, PartialEq)]
pub struct RankerOutput {
    /// Full unparsed text shown to the user.
    pub text_response: String,
    pub structured_cards: Vec<RankedCard>,
    pub used_fallback: bool,
}

/// Full per-candidate view for the ranker: a superset of the sub-agent brief.
#[derive(Debug, Serialize)]
struct CandidateSummary<'a> {
    name: &'a str,
    issuer: &'a str,
    category: &'a str,
    annual_fee: f64,
    intro_apr: &'a str,
    regular_apr: &'a str,
    credit_score: CreditTier,
    rewards: &'a str,
    signup_bonus: &'a str,
    foreign_fee: &'a str,
    target_audience: &'a str,
}

impl<'a> From<&'a CardRecord> for CandidateSummary<'a> {
    fn from(card: &'a CardRecord) -> Self {
        Self {
            name: &card.name,
            issuer: &card.issuer,
            category: &card.category,
            annual_fee: card.annual_fee,
            intro_apr: &card.intro_apr,
            regular_apr: &card.regular_apr,
            credit_score: card.credit_score_required,
            rewards: &card.rewards,
            signup_bonus: &card.signup_bonus,
            foreign_fee: &card.foreign_fee,
            target_audience: &card.target_audience,
        }
    }
}

/// Picks and ranks up to three of `candidates` for `profile`. Never fails.
pub async fn rank_candidates(
    candidates: &[CardRecord],
    profile: &UserProfile,
    model: &ModelHandle,
) -> RankerOutput {
    if candidates.is_empty() {
        info!("No candidates survived filtering, skipping final ranking");
        return RankerOutput {
            text_response: NO_MATCH_MESSAGE.to_string(),
            structured_cards: Vec::new(),
            used_fallback: true,
        };
    }

    info!("Final ranking over {} candidates", candidates.len());

    match rank_with_model(candidates, profile, model).await {
        Ok(output) => output,
        Err(e) => {
            warn!("Final ranking failed, using fallback recommendation: {}", e);
            fallback_output(candidates)
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum RankError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("model answer contained no ranked blocks")]
    NoBlocks,
}

async fn rank_with_model(
    candidates: &[CardRecord],
    profile: &UserProfile,
    model: &ModelHandle,
) -> Result<RankerOutput, RankError> {
    let prompt = build_ranker_prompt(candidates, profile).map_err(LlmError::from)?;
    debug!("Ranker prompt is {} characters", prompt.len());

    let text = model.invoke(RANKER_SYSTEM, &prompt).await?;
    let blocks = parse_blocks(&text);
    if blocks.is_empty() {
        return Err(RankError::NoBlocks);
    }

    let structured_cards = match_blocks(&blocks, candidates);
    info!(
        "Ranker returned {} blocks, {} matched candidates",
        blocks.len(),
        structured_cards.len()
    );

    Ok(RankerOutput {
        text_response: text,
        structured_cards,
        used_fallback: false,
    })
}

/// Deterministic answer from the first two candidates, parsed like a model answer.
pub fn fallback_output(candidates: &[CardRecord]) -> RankerOutput {
    let top = &candidates[..candidates.len().min(FALLBACK_CARD_COUNT)];
    let text_response = fallback_text(top);
    let structured_cards = extract_structured_cards(&text_response, top);
    RankerOutput {
        text_response,
        structured_cards,
        used_fallback: true,
    }
}

/// Renders the fallback recommendation in the numbered template.
pub fn fallback_text(top: &[CardRecord]) -> String {
    if top.is_empty() {
        return NO_MATCH_MESSAGE.to_string();
    }

    let mut text = format!("{FALLBACK_INTRO}\n\n");
    for (i, card) in top.iter().enumerate() {
        text.push_str(&format!(
            "{}. **{}** by {}\n   - **Annual Fee:** {}\n   - **Category:** {}\n   - **Target Audience:** {}\n\n",
            i + 1,
            card.name,
            card.issuer,
            card.fee_display(),
            or_default(&card.category, "General"),
            or_default(&card.target_audience, "General users"),
        ));
    }
    text.push_str(FALLBACK_OUTRO);
    text
}

pub fn build_ranker_prompt(
    candidates: &[CardRecord],
    profile: &UserProfile,
) -> Result<String, serde_json::Error> {
    let summaries: Vec<CandidateSummary<'_>> =
        candidates.iter().map(CandidateSummary::from).collect();
    let cards_json = serde_json::to_string_pretty(&summaries)?;

    let student_instruction = if profile.is_student() {
        RANKER_STUDENT_INSTRUCTION
    } else {
        ""
    };

    Ok(RANKER_PROMPT_TEMPLATE
        .replace("{exact_names_instruction}", EXACT_NAMES_INSTRUCTION)
        .replace("{student_instruction}", student_instruction)
        .replace("{card_count}", &candidates.len().to_string())
        .replace("{cards_json}", &cards_json)
        .replace("{profile_summary}", &profile.summary())
        .replace("{user_line}", &user_line(profile)))
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}
