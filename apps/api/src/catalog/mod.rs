//! The canonical `CardRecord` shape and the catalog collaborator.
//!
//! Raw catalog files are normalized once at load time (see `loader`); nothing
//! past this module ever looks at raw keys.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod loader;

pub use loader::load_catalog;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Credit score tier a card requires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditTier {
    Excellent,
    #[default]
    Good,
    Fair,
    Poor,
}

impl CreditTier {
    /// Maps free-text credit requirements onto a tier. Anything unrecognized is `Good`.
    pub fn from_text(text: &str) -> Self {
        let text = text.to_lowercase();
        if text.contains("excellent") {
            CreditTier::Excellent
        } else if text.contains("fair") {
            CreditTier::Fair
        } else if text.contains("poor") {
            CreditTier::Poor
        } else {
            CreditTier::Good
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CreditTier::Excellent => "excellent",
            CreditTier::Good => "good",
            CreditTier::Fair => "fair",
            CreditTier::Poor => "poor",
        }
    }
}

impl fmt::Display for CreditTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad card family derived from the catalog's category text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Travel,
    Cashback,
    Student,
    Business,
    Secured,
    #[default]
    General,
}

impl CardType {
    /// First matching family wins: travel, cashback, student, business, secured.
    pub fn from_category(category: &str) -> Self {
        let category = category.to_lowercase();
        if ["travel", "airline", "hotel"]
            .iter()
            .any(|k| category.contains(k))
        {
            CardType::Travel
        } else if category.contains("cash back") || category.contains("cashback") {
            CardType::Cashback
        } else if category.contains("student") {
            CardType::Student
        } else if category.contains("business") {
            CardType::Business
        } else if category.contains("secured") {
            CardType::Secured
        } else {
            CardType::General
        }
    }
}

/// A single catalog entry in canonical shape.
///
/// `name` is the identifier used for every cross-reference between partitions,
/// model output, and final structured results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardRecord {
    pub name: String,
    pub issuer: String,
    pub card_type: CardType,
    pub category: String,
    /// Annual fee in dollars; 0.0 when the catalog lists none.
    pub annual_fee: f64,
    pub intro_apr: String,
    pub regular_apr: String,
    pub credit_score_required: CreditTier,
    pub rewards: String,
    pub signup_bonus: String,
    pub foreign_fee: String,
    pub target_audience: String,
}

impl CardRecord {
    /// "$95" for whole-dollar fees, "$39.99" otherwise.
    pub fn fee_display(&self) -> String {
        if self.annual_fee.fract() == 0.0 {
            format!("${:.0}", self.annual_fee)
        } else {
            format!("${:.2}", self.annual_fee)
        }
    }

    /// Case-insensitive exact name comparison.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.trim().to_lowercase() == name.trim().to_lowercase()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Catalog collaborator
// ────────────────────────────────────────────────────────────────────────────

/// Read-only source of every card known to the process.
/// Order must be stable across calls; partitioning depends on it.
pub trait CardCatalog: Send + Sync {
    fn get_all_cards(&self) -> &[CardRecord];
}

/// In-memory catalog, loaded once at startup and immutable afterwards.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    cards: Vec<CardRecord>,
}

impl StaticCatalog {
    pub fn new(cards: Vec<CardRecord>) -> Self {
        Self { cards }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }
}

impl CardCatalog for StaticCatalog {
    fn get_all_cards(&self) -> &[CardRecord] {
        &self.cards
    }
}
