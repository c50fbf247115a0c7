// Minimax regret of a selection against an explicit baseline pool

use rayon::prelude::*;
use std::cmp::Ordering;

use crate::config::ModelParams;
use crate::models::{GroupMember, Trail, Utility};
use crate::utils::utility::individual_utility_with;

/// Precomputed member utilities over a baseline pool.
///
/// The "best achievable" utility for a member and a selection of size `s`
/// is the sum of that member's `s` highest utilities over the pool the
/// evaluator was built from. Callers decide what that pool is: the
/// candidate pool a selector chooses from, a full catalog, or the selection
/// itself.
#[derive(Debug, Clone)]
pub struct RegretEvaluator<'a> {
    group: &'a [GroupMember],
    params: ModelParams,
    /// utilities[m][i]: utility of pool trail i for member m
    utilities: Vec<Vec<Utility>>,
    /// best_prefix[m][s]: sum of member m's top s utilities, best_prefix[m][0] = 0
    best_prefix: Vec<Vec<Utility>>,
}

impl<'a> RegretEvaluator<'a> {
    /// Builds the utility table for `pool` and `group`
    pub fn new<T>(pool: &[T], group: &'a [GroupMember], params: &ModelParams) -> Self
    where
        T: AsRef<Trail> + Sync,
    {
        let utilities: Vec<Vec<Utility>> = group
            .par_iter()
            .map(|member| {
                pool.iter()
                    .map(|trail| individual_utility_with(member, trail.as_ref(), params))
                    .collect()
            })
            .collect();

        let best_prefix = utilities
            .iter()
            .map(|row| {
                let mut sorted = row.clone();
                sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
                let mut prefix = Vec::with_capacity(sorted.len() + 1);
                let mut acc = 0.0;
                prefix.push(acc);
                for u in sorted {
                    acc += u;
                    prefix.push(acc);
                }
                prefix
            })
            .collect();

        Self {
            group,
            params: *params,
            utilities,
            best_prefix,
        }
    }

    pub fn pool_len(&self) -> usize {
        self.best_prefix.first().map_or(0, |p| p.len() - 1)
    }

    pub fn group(&self) -> &'a [GroupMember] {
        self.group
    }

    /// Utility of pool trail `index` for `member`
    pub fn utility(&self, member: usize, index: usize) -> Utility {
        self.utilities[member][index]
    }

    /// Sum of the member's `size` best pool utilities, capped at the pool size
    pub fn best_utility(&self, member: usize, size: usize) -> Utility {
        let prefix = &self.best_prefix[member];
        prefix[size.min(prefix.len() - 1)]
    }

    /// Per-member utility sums of a selection given as pool indices
    pub fn selected_sums(&self, selection: &[usize]) -> Vec<Utility> {
        self.utilities
            .iter()
            .map(|row| selection.iter().map(|&i| row[i]).sum())
            .collect()
    }

    /// Per-member regret of a selection of pool indices
    pub fn member_regrets(&self, selection: &[usize]) -> Vec<f64> {
        self.selected_sums(selection)
            .iter()
            .enumerate()
            .map(|(m, selected)| self.best_utility(m, selection.len()) - selected)
            .collect()
    }

    /// Maximum regret across members of a selection of pool indices
    pub fn regret_of_indices(&self, selection: &[usize]) -> f64 {
        let sums = self.selected_sums(selection);
        self.max_regret(selection.len(), |m| sums[m])
    }

    /// Maximum regret of `base` (given as per-member sums over `base_len`
    /// trails) extended by pool trail `candidate`
    pub fn regret_with_candidate(&self, base_sums: &[Utility], base_len: usize, candidate: usize) -> f64 {
        self.max_regret(base_len + 1, |m| base_sums[m] + self.utilities[m][candidate])
    }

    /// Maximum regret of arbitrary trails, which need not come from the pool
    pub fn regret_of_trails<T: AsRef<Trail>>(&self, selection: &[T]) -> f64 {
        self.max_regret(selection.len(), |m| {
            selection
                .iter()
                .map(|t| individual_utility_with(&self.group[m], t.as_ref(), &self.params))
                .sum()
        })
    }

    fn max_regret<F>(&self, size: usize, selected: F) -> f64
    where
        F: Fn(usize) -> Utility,
    {
        (0..self.group.len())
            .map(|m| self.best_utility(m, size) - selected(m))
            .fold(0.0, f64::max)
    }
}

/// Minimax regret of `selection` measured against `pool`, using `params`
pub fn regret_with<S, P>(selection: &[S], pool: &[P], group: &[GroupMember], params: &ModelParams) -> f64
where
    S: AsRef<Trail>,
    P: AsRef<Trail> + Sync,
{
    if selection.is_empty() {
        return 0.0;
    }
    RegretEvaluator::new(pool, group, params).regret_of_trails(selection)
}

/// Minimax regret of `selection` measured against `pool`.
///
/// For every member, regret is the gap between the sum of their
/// `selection.len()` best utilities over `pool` and the sum of their
/// utilities over `selection`; the result is the largest such gap.
pub fn regret<S, P>(selection: &[S], pool: &[P], group: &[GroupMember]) -> f64
where
    S: AsRef<Trail>,
    P: AsRef<Trail> + Sync,
{
    regret_with(selection, pool, group, &ModelParams::default())
}
