//! Ranked-template parser.
//!
//! Two phases: split the text into numbered blocks, then pull the bold card name
//! and the "Reasoning:" paragraph out of each block. Names resolve against the
//! candidate list by case-insensitive exact match, then by word overlap (first
//! candidate sharing any word wins).
//!
//! This is best-effort extraction from free text and is approximate by nature.
//! It is exercised against fixed fixtures only.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::catalog::CardRecord;

/// Upper bound on structured recommendations.
pub const MAX_RECOMMENDATIONS: usize = 3;

static BLOCK_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.\s+\*\*").expect("valid block regex"));
static MARKED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid name regex"));
static REASONING_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)(?:\*\*)?Reasoning:(?:\*\*)?\s*(.+)").expect("valid label regex"));
static REASONING_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n|\n\s*\d+\.").expect("valid end regex"));

/// A catalog card as recommended, with the model's reasoning attached.
/// Card fields always come from the catalog, never from model text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCard {
    #[serde(flatten)]
    pub card: CardRecord,
    pub reasoning: String,
}

/// Name and reasoning lifted from one numbered block.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBlock {
    pub name: String,
    pub reasoning: String,
}

/// Splits text at each numbered-item boundary ("1. **").
///
/// Text before the first boundary is dropped. Without any boundary the whole
/// text is treated as one block.
pub fn split_blocks(text: &str) -> Vec<&str> {
    let starts: Vec<usize> = BLOCK_START.find_iter(text).map(|m| m.start()).collect();
    if starts.is_empty() {
        let trimmed = text.trim();
        return if trimmed.is_empty() {
            Vec::new()
        } else {
            vec![trimmed]
        };
    }

    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            text[start..end].trim()
        })
        .filter(|block| !block.is_empty())
        .collect()
}

/// Blocks that carry a marked name span. Blocks without one are skipped.
pub fn parse_blocks(text: &str) -> Vec<ParsedBlock> {
    split_blocks(text)
        .into_iter()
        .filter_map(|block| {
            let name = MARKED_NAME.captures(block)?.get(1)?.as_str().trim();
            if name.is_empty() {
                return None;
            }
            Some(ParsedBlock {
                name: name.to_string(),
                reasoning: extract_reasoning(block),
            })
        })
        .collect()
}

/// Text after the "Reasoning:" label, up to a blank line or the next numbered item.
pub fn extract_reasoning(block: &str) -> String {
    let Some(rest) = REASONING_LABEL
        .captures(block)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
    else {
        return String::new();
    };

    let end = REASONING_END.find(rest).map_or(rest.len(), |m| m.start());
    rest[..end].trim().to_string()
}

/// Resolves an extracted name: exact (case-insensitive) first, then word overlap.
pub fn find_card<'a>(name: &str, candidates: &'a [CardRecord]) -> Option<&'a CardRecord> {
    if let Some(card) = candidates.iter().find(|c| c.name_matches(name)) {
        return Some(card);
    }

    let wanted = tokens(name);
    let fuzzy = candidates
        .iter()
        .find(|c| tokens(&c.name).iter().any(|t| wanted.contains(t)));
    if let Some(card) = fuzzy {
        debug!("Fuzzy matched '{}' to '{}'", name, card.name);
    }
    fuzzy
}

/// Full structured extraction: parse blocks, resolve names, keep at most three.
/// Unmatched blocks are dropped.
pub fn extract_structured_cards(text: &str, candidates: &[CardRecord]) -> Vec<RankedCard> {
    match_blocks(&parse_blocks(text), candidates)
}

pub fn match_blocks(blocks: &[ParsedBlock], candidates: &[CardRecord]) -> Vec<RankedCard> {
    blocks
        .iter()
        .filter_map(|block| match find_card(&block.name, candidates) {
            Some(card) => Some(RankedCard {
                card: card.clone(),
                reasoning: block.reasoning.clone(),
            }),
            None => {
                debug!("No candidate for ranked card '{}', dropping", block.name);
                None
            }
        })
        .take(MAX_RECOMMENDATIONS)
        .collect()
}

fn tokens(name: &str) -> Vec<String> {
    name.split_whitespace()
        .map(|w| {
            w.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::card;

    const THREE_BLOCKS: &str = "Here are my picks for you.\n\n\
1. **Chase Freedom Unlimited**\n   - **Issuer:** Chase\n   - **Annual Fee:** $0\n\n   **Reasoning:** Flat 1.5% back suits everyday dining spend.\nNo annual fee keeps it simple.\n\n\
2. **citi double cash**\n   - **Issuer:** Citi\n   - **Annual Fee:** $0\n\n   **Reasoning:** Earns 2% on everything, which beats most tiered cards.\n\n\
3. **Discover it Student Cash Back**\n   - **Issuer:** Discover\n\n   **Reasoning:** Builds credit with no fee.\n";

    fn candidates() -> Vec<CardRecord> {
        vec![
            card("Citi Double Cash"),
            card("Chase Freedom Unlimited"),
            card("Discover it Student Cash Back"),
            card("Capital One Venture"),
        ]
    }

    #[test]
    fn test_three_block_fixture_yields_three_records_in_order() {
        let cards = extract_structured_cards(THREE_BLOCKS, &candidates());

        let names: Vec<_> = cards.iter().map(|c| c.card.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Chase Freedom Unlimited",
                "Citi Double Cash",
                "Discover it Student Cash Back"
            ]
        );
        assert!(cards.iter().all(|c| !c.reasoning.is_empty()));
        assert_eq!(
            cards[0].reasoning,
            "Flat 1.5% back suits everyday dining spend.\nNo annual fee keeps it simple."
        );
    }

    #[test]
    fn test_split_drops_preamble() {
        let blocks = split_blocks(THREE_BLOCKS);
        assert_eq!(blocks.len(), 3);
        assert!(blocks[0].starts_with("1. **Chase Freedom Unlimited**"));
    }

    #[test]
    fn test_text_without_boundaries_is_one_block() {
        let blocks = parse_blocks("I'd go with **Capital One Venture** for travel.");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].name, "Capital One Venture");
        assert!(blocks[0].reasoning.is_empty());
    }

    #[test]
    fn test_text_without_marked_names_has_no_blocks() {
        assert!(parse_blocks("Sorry, I cannot help with that.").is_empty());
        assert!(parse_blocks("   ").is_empty());
    }

    #[test]
    fn test_reasoning_stops_at_next_numbered_item() {
        let block = "**Reasoning:** Great for groceries.\n2. something else";
        assert_eq!(extract_reasoning(block), "Great for groceries.");
    }

    #[test]
    fn test_reasoning_accepts_plain_label() {
        let block = "1. **Card**\nReasoning: Plain label works too.";
        assert_eq!(extract_reasoning(block), "Plain label works too.");
    }

    #[test]
    fn test_reasoning_missing_is_empty() {
        assert_eq!(extract_reasoning("1. **Card**\n - **Issuer:** X"), "");
    }

    #[test]
    fn test_exact_match_wins_over_fuzzy() {
        let pool = vec![card("Chase Sapphire Reserve"), card("Chase Sapphire Preferred")];
        let found = find_card("chase sapphire preferred", &pool).unwrap();
        assert_eq!(found.name, "Chase Sapphire Preferred");
    }

    #[test]
    fn test_fuzzy_match_takes_first_overlapping_candidate() {
        let pool = vec![card("Citi Double Cash"), card("Capital One Venture")];
        let found = find_card("Venture Rewards Card", &pool).unwrap();
        assert_eq!(found.name, "Capital One Venture");
    }

    #[test]
    fn test_fuzzy_match_ignores_punctuation() {
        let pool = vec![card("Blue Cash Preferred")];
        assert!(find_card("(Preferred)", &pool).is_some());
    }

    #[test]
    fn test_unmatched_blocks_are_dropped() {
        let text = "1. **Zzz Platinum**\n**Reasoning:** n/a\n\n2. **Citi Double Cash**\n**Reasoning:** solid";
        let cards = extract_structured_cards(text, &candidates());
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].card.name, "Citi Double Cash");
        assert_eq!(cards[0].reasoning, "solid");
    }

    #[test]
    fn test_at_most_three_records() {
        let text = (1..=5)
            .map(|i| format!("{i}. **Citi Double Cash**\n**Reasoning:** pick {i}\n"))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(extract_structured_cards(&text, &candidates()).len(), 3);
    }

    #[test]
    fn test_ranked_card_serializes_flat() {
        let ranked = RankedCard {
            card: card("Citi Double Cash"),
            reasoning: "why".to_string(),
        };
        let value = serde_json::to_value(&ranked).unwrap();
        assert_eq!(value["name"], "Citi Double Cash");
        assert_eq!(value["reasoning"], "why");
    }
}
