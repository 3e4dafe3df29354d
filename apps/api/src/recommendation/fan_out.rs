//! Parallel coordinator: one sub-agent per partition, merged in agent order.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::catalog::CardRecord;
use crate::models::profile::UserProfile;
use crate::recommendation::partition::{partition, AGENT_COUNT};
use crate::recommendation::sub_agent::{fallback_result, run_sub_agent, SubAgentResult};
use crate::recommendation::ModelHandle;

/// Maximum sub-agents in flight at once.
pub const FAN_OUT_WIDTH: usize = 3;

#[derive(Debug, Clone)]
pub struct FanOutResult {
    /// One result per agent, indexed by agent.
    pub agent_results: Vec<SubAgentResult>,
    /// Selections concatenated agent 0, 1, 2. Not deduplicated.
    pub combined: Vec<CardRecord>,
}

impl FanOutResult {
    pub fn from_results(agent_results: Vec<SubAgentResult>) -> Self {
        let combined = agent_results
            .iter()
            .flat_map(|r| r.selected_cards.iter().cloned())
            .collect();
        Self {
            agent_results,
            combined,
        }
    }
}

/// Runs the three sub-agents concurrently and waits for all of them.
///
/// Completion order does not affect the merge. A worker that dies is replaced
/// by the deterministic fallback for its partition.
pub async fn run_fan_out(
    cards: &[CardRecord],
    profile: &UserProfile,
    model: &ModelHandle,
) -> FanOutResult {
    let permits = Arc::new(Semaphore::new(FAN_OUT_WIDTH));
    let mut workers = JoinSet::new();

    for agent_index in 0..AGENT_COUNT {
        let slice = partition(cards, agent_index).to_vec();
        let profile = profile.clone();
        let model = model.clone();
        let permits = Arc::clone(&permits);

        workers.spawn(async move {
            // the semaphore is never closed
            let _permit = permits.acquire_owned().await.ok();
            let result = run_sub_agent(agent_index, &slice, &profile, &model).await;
            (agent_index, result)
        });
    }

    let mut slots: Vec<Option<SubAgentResult>> = vec![None; AGENT_COUNT];
    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok((agent_index, result)) => {
                info!(
                    "{} finished: {} selected, fallback={}",
                    result.agent_id,
                    result.selected_cards.len(),
                    result.used_fallback
                );
                slots[agent_index] = Some(result);
            }
            Err(e) => error!("Sub-agent worker failed to complete: {}", e),
        }
    }

    let agent_results: Vec<SubAgentResult> = slots
        .into_iter()
        .enumerate()
        .map(|(agent_index, slot)| {
            slot.unwrap_or_else(|| {
                fallback_result(
                    agent_index,
                    partition(cards, agent_index),
                    "Fallback selection: worker did not complete".to_string(),
                )
            })
        })
        .collect();

    let result = FanOutResult::from_results(agent_results);
    info!(
        "Fan-out complete: {} candidates from {} cards",
        result.combined.len(),
        cards.len()
    );
    result
}
