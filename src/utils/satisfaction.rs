// Group aggregation of individual utilities

use crate::config::ModelParams;
use crate::models::{GroupMember, Trail, Utility};
use crate::utils::utility::individual_utility_with;
use serde::Serialize;

/// Group-level view of how well one trail suits a group
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupSatisfaction {
    /// Mean member utility
    pub avg: Utility,

    /// Utility of the worst-off member
    pub fairness: Utility,

    /// Agreement in [0, 1]; 1 when every member scores the trail equally
    pub consensus: f64,

    /// Population standard deviation of member utilities
    pub controversy: f64,

    /// Blended score: avg, fairness and consensus * 100
    pub total: f64,
}

impl GroupSatisfaction {
    /// Aggregates already computed member utilities.
    ///
    /// `scores` must be non-empty; an empty slice yields NaN statistics.
    pub fn from_scores(scores: &[Utility], params: &ModelParams) -> Self {
        let n = scores.len() as f64;
        let avg = scores.iter().sum::<f64>() / n;
        let fairness = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let variance = scores.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / n;
        let controversy = variance.sqrt();
        let consensus = (1.0 - controversy / params.consensus_divisor).max(0.0);

        let blend = &params.satisfaction;
        let total = blend.avg * avg + blend.fairness * fairness + blend.consensus * consensus * 100.0;

        Self {
            avg,
            fairness,
            consensus,
            controversy,
            total,
        }
    }
}

/// Utility of `trail` for every member, in group order
pub fn member_utilities(trail: &Trail, group: &[GroupMember], params: &ModelParams) -> Vec<Utility> {
    group
        .iter()
        .map(|member| individual_utility_with(member, trail, params))
        .collect()
}

/// Group statistics for `trail` using `params`
pub fn group_satisfaction_with(trail: &Trail, group: &[GroupMember], params: &ModelParams) -> GroupSatisfaction {
    GroupSatisfaction::from_scores(&member_utilities(trail, group, params), params)
}

/// Group statistics for `trail`. The group must not be empty.
pub fn group_satisfaction(trail: &Trail, group: &[GroupMember]) -> GroupSatisfaction {
    group_satisfaction_with(trail, group, &ModelParams::default())
}
