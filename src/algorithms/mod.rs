pub mod greedy_regret;
pub mod pareto_weighted;

// Common algorithm traits
use crate::models::{AlgorithmKind, GroupMember, Selection, Trail};

/// Trait for group trail selectors
pub trait GroupSelector {
    /// Which algorithm this selector runs
    fn kind(&self) -> AlgorithmKind;

    /// Select at most `k` distinct trails from `candidates` for `group`.
    ///
    /// Returns an empty selection for an empty pool or `k == 0`. The group
    /// is expected to be validated by the caller.
    fn select(&self, candidates: &[Trail], group: &[GroupMember], k: usize) -> Selection;
}
