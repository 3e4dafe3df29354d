//! Deterministic `LanguageModel` stubs shared by the pipeline tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::catalog::{CardRecord, CardType};
use crate::llm_client::{LanguageModel, LlmError};
use crate::recommendation::prompts::RANKER_SYSTEM;

/// Always fails like a provider outage.
pub struct FailingModel;

#[async_trait]
impl LanguageModel for FailingModel {
    async fn invoke(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::Api {
            status: 503,
            message: "upstream unavailable".to_string(),
        })
    }
}

/// Returns the same text for every call.
pub struct FixedModel(String);

impl FixedModel {
    pub fn new(text: &str) -> Self {
        Self(text.to_string())
    }
}

#[async_trait]
impl LanguageModel for FixedModel {
    async fn invoke(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
        Ok(self.0.clone())
    }
}

/// Counts calls and answers with an empty selection.
#[derive(Default)]
pub struct CountingModel {
    calls: Arc<AtomicUsize>,
}

impl CountingModel {
    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl LanguageModel for CountingModel {
    async fn invoke(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("[]".to_string())
    }
}

/// Never answers within any sane timeout.
pub struct SlowModel;

#[async_trait]
impl LanguageModel for SlowModel {
    async fn invoke(&self, _system: &str, _prompt: &str) -> Result<String, LlmError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("[]".to_string())
    }
}

/// A stand-in advisor that reads the prompt the way a cooperative model would.
///
/// Sub-agent calls keep the first half of the cards named in the prompt, plus any
/// student card when the student block is present. Ranker calls rank the named
/// cards in prompt order, student cards first when the student block is present,
/// and answer in the numbered template.
pub struct ScriptedModel {
    catalog: Vec<CardRecord>,
}

impl ScriptedModel {
    pub fn new(catalog: Vec<CardRecord>) -> Self {
        Self { catalog }
    }

    fn named_in<'a>(&'a self, prompt: &str) -> Vec<&'a CardRecord> {
        let mut named: Vec<(usize, &CardRecord)> = self
            .catalog
            .iter()
            .filter_map(|c| {
                prompt
                    .find(&format!("\"name\": \"{}\"", c.name))
                    .map(|pos| (pos, c))
            })
            .collect();
        named.sort_by_key(|(pos, _)| *pos);
        named.into_iter().map(|(_, c)| c).collect()
    }

    fn sub_agent_answer(&self, prompt: &str) -> String {
        let named = self.named_in(prompt);
        let student = prompt.contains("The user is a STUDENT");
        let mut picks: Vec<&CardRecord> = named
            .iter()
            .copied()
            .filter(|c| student && c.card_type == CardType::Student)
            .collect();
        for card in named.iter().take(named.len() / 2) {
            if !picks.iter().any(|p| p.name == card.name) {
                picks.push(card);
            }
        }
        let selections: Vec<_> = picks
            .iter()
            .map(|c| serde_json::json!({"name": c.name, "reasoning": "fits the profile"}))
            .collect();
        serde_json::Value::Array(selections).to_string()
    }

    fn ranker_answer(&self, prompt: &str) -> String {
        let mut named = self.named_in(prompt);
        if prompt.contains("The user is a STUDENT") {
            named.sort_by_key(|c| c.card_type != CardType::Student);
        }
        named
            .iter()
            .take(3)
            .enumerate()
            .map(|(i, c)| {
                format!(
                    "{}. **{}**\n   - **Issuer:** {}\n   - **Annual Fee:** {}\n\n   **Reasoning:** Rank {} for this profile.\n",
                    i + 1,
                    c.name,
                    c.issuer,
                    c.fee_display(),
                    i + 1
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn invoke(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        if system == RANKER_SYSTEM {
            Ok(self.ranker_answer(prompt))
        } else {
            Ok(self.sub_agent_answer(prompt))
        }
    }
}
