//! Catalog Loader — reads the issuer-keyed JSON catalog and normalizes every raw
//! card into a `CardRecord`.
//!
//! Raw files mix key spellings ("Card name", "name", "ANNUAL FEE", ...). Keys are
//! resolved case-insensitively against an alias list here, once.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{CardRecord, CardType, CreditTier, StaticCatalog};

static FEE_AMOUNT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\s*(\d[\d,]*(?:\.\d+)?)").expect("valid fee regex"));

const NAME_KEYS: &[&str] = &["Card name", "name", "card_name"];
const FEE_KEYS: &[&str] = &["Annual fee", "annual_fee"];
const CATEGORY_KEYS: &[&str] = &["Category", "category"];
const INTRO_APR_KEYS: &[&str] = &["Intro APR", "intro_apr"];
const REGULAR_APR_KEYS: &[&str] = &["Regular APR", "regular_apr"];
const CREDIT_KEYS: &[&str] = &["Credit score", "credit_score", "credit_score_required"];
const REWARDS_KEYS: &[&str] = &["Rewards", "rewards"];
const BONUS_KEYS: &[&str] = &["Sign-up bonus", "signup_bonus", "sign_up_bonus"];
const FOREIGN_FEE_KEYS: &[&str] = &["Foreign fee", "foreign_fee", "foreign_transaction_fee"];
const AUDIENCE_KEYS: &[&str] = &["Target audience", "target_audience"];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Catalog is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unexpected catalog shape: {0}")]
    Shape(String),
}

/// Loads the catalog at `path`.
///
/// A missing file yields an empty catalog so the rest of the service keeps
/// running; a present-but-malformed file is an error.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<StaticCatalog, CatalogError> {
    let path = path.as_ref();
    if !path.exists() {
        warn!("Catalog {} not found, using empty catalog", path.display());
        return Ok(StaticCatalog::default());
    }

    let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let cards = parse_catalog(&raw)?;
    info!("Loaded {} cards from {}", cards.len(), path.display());
    Ok(StaticCatalog::new(cards))
}

/// Parses `{ "<issuer>": [ {raw card}, ... ], ... }` in file order.
pub fn parse_catalog(raw: &str) -> Result<Vec<CardRecord>, CatalogError> {
    let issuers: Map<String, Value> = serde_json::from_str(raw)?;
    let mut cards = Vec::new();

    for (issuer, entries) in &issuers {
        let entries = entries.as_array().ok_or_else(|| {
            CatalogError::Shape(format!("issuer '{issuer}' must map to an array of cards"))
        })?;
        for entry in entries {
            match entry.as_object() {
                Some(fields) => cards.push(normalize_card(fields, issuer)),
                None => warn!("Skipping non-object card entry under issuer '{}'", issuer),
            }
        }
    }

    Ok(cards)
}

/// Converts one raw card object into the canonical shape.
pub fn normalize_card(fields: &Map<String, Value>, issuer: &str) -> CardRecord {
    let raw = RawCard(fields);
    let category = raw.text(CATEGORY_KEYS).unwrap_or_default();

    CardRecord {
        name: raw
            .text(NAME_KEYS)
            .unwrap_or_else(|| "Unknown Card".to_string()),
        issuer: issuer.to_string(),
        card_type: CardType::from_category(&category),
        annual_fee: raw.fee(FEE_KEYS),
        intro_apr: raw.text(INTRO_APR_KEYS).unwrap_or_else(|| "N/A".to_string()),
        regular_apr: raw
            .text(REGULAR_APR_KEYS)
            .unwrap_or_else(|| "Variable APR".to_string()),
        credit_score_required: CreditTier::from_text(
            &raw.text(CREDIT_KEYS).unwrap_or_default(),
        ),
        rewards: raw.text(REWARDS_KEYS).unwrap_or_default(),
        signup_bonus: raw.text(BONUS_KEYS).unwrap_or_default(),
        foreign_fee: raw.text(FOREIGN_FEE_KEYS).unwrap_or_default(),
        target_audience: raw.text(AUDIENCE_KEYS).unwrap_or_default(),
        category,
    }
}

/// Extracts the first dollar amount from fee text, e.g. "$95 ($0 first year)" → 95.0.
pub fn parse_fee(text: &str) -> f64 {
    FEE_AMOUNT
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().replace(',', "").parse::<f64>().ok())
        .unwrap_or(0.0)
}

struct RawCard<'a>(&'a Map<String, Value>);

impl RawCard<'_> {
    fn value(&self, aliases: &[&str]) -> Option<&Value> {
        aliases.iter().find_map(|alias| {
            self.0
                .iter()
                .find(|(key, _)| key.trim().eq_ignore_ascii_case(alias))
                .map(|(_, v)| v)
        })
    }

    /// Blank strings count as absent so field defaults apply.
    fn text(&self, aliases: &[&str]) -> Option<String> {
        match self.value(aliases)? {
            Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    fn fee(&self, aliases: &[&str]) -> f64 {
        match self.value(aliases) {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
            Some(Value::String(s)) => parse_fee(s),
            _ => 0.0,
        }
    }
}
