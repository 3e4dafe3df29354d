//! Catalog Partitioner — splits the catalog into one contiguous slice per sub-agent.

use std::ops::Range;

/// Number of sub-agents the catalog is split across.
pub const AGENT_COUNT: usize = 3;

/// Index range of the partition owned by `agent_index`.
///
/// Every agent gets ⌊len/3⌋ items and the last agent absorbs the remainder, so
/// the three ranges tile `0..len` exactly. Indices past the last agent get an
/// empty range.
pub fn partition_range(len: usize, agent_index: usize) -> Range<usize> {
    let share = len / AGENT_COUNT;
    if agent_index >= AGENT_COUNT {
        return len..len;
    }
    let start = agent_index * share;
    let end = if agent_index == AGENT_COUNT - 1 {
        len
    } else {
        start + share
    };
    start..end
}

/// The slice of `items` owned by `agent_index`. Pure function of order and length.
pub fn partition<T>(items: &[T], agent_index: usize) -> &[T] {
    &items[partition_range(items.len(), agent_index)]
}
