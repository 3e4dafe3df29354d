// Recommendation pipeline.
// Implements: catalog partitioning, parallel sub-agent filtering, fan-in merge,
// final ranking with template parsing, and result assembly.
// All model calls go through the `LanguageModel` capability, each bounded by a timeout.

use std::sync::Arc;
use std::time::Duration;

use crate::llm_client::{LanguageModel, LlmError};

pub mod assembler;
pub mod fan_out;
pub mod parser;
pub mod partition;
pub mod pipeline;
pub mod prompts;
pub mod ranker;
pub mod sub_agent;

#[cfg(test)]
pub(crate) mod test_support;

pub use assembler::Recommendation;
pub use parser::RankedCard;
pub use pipeline::{PipelineError, RecommendationEngine};

/// A shared language model plus the per-call time limit applied to it.
///
/// Cheap to clone; every fan-out worker gets its own handle.
#[derive(Clone)]
pub struct ModelHandle {
    model: Arc<dyn LanguageModel>,
    timeout: Duration,
}

impl ModelHandle {
    pub fn new(model: Arc<dyn LanguageModel>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    /// Invokes the model once. An elapsed timeout is reported as `LlmError::Timeout`.
    pub async fn invoke(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        tokio::time::timeout(self.timeout, self.model.invoke(system, prompt))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout))?
    }
}
