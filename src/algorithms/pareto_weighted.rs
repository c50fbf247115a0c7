use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::algorithms::GroupSelector;
use crate::config::ModelParams;
use crate::models::{AlgorithmKind, Difficulty, GroupMember, Selection, Trail};
use crate::utils::satisfaction::{group_satisfaction_with, GroupSatisfaction};
use crate::utils::skyline::skyline_indices;

/// Number of objectives compared for Pareto dominance
pub const OBJECTIVE_COUNT: usize = 6;

/// Weights of the linear score used to rank the frontier
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub avg: f64,
    pub min: f64,
    pub cons: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            avg: 0.4,
            min: 0.3,
            cons: 0.3,
        }
    }
}

impl ScoringWeights {
    pub fn score(&self, satisfaction: &GroupSatisfaction) -> f64 {
        self.avg * satisfaction.avg
            + self.min * satisfaction.fairness
            + self.cons * (satisfaction.consensus * 100.0)
    }
}

/// Per-trail objectives, all larger-is-better:
/// average satisfaction, fairness, accessibility, distance, time, consensus
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectiveVector(pub [f64; OBJECTIVE_COUNT]);

impl AsRef<[f64]> for ObjectiveVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

fn accessibility(difficulty: Difficulty, params: &ModelParams) -> f64 {
    match difficulty {
        Difficulty::Easy => params.accessibility.easy,
        Difficulty::Moderate => params.accessibility.moderate,
        Difficulty::Hard => params.accessibility.hard,
    }
}

/// Objective vector of `trail` for `group`.
///
/// Distance and time objectives are `1 - value / ceiling` and are not
/// clamped, so trails beyond the ceilings score below zero.
pub fn objectives(trail: &Trail, group: &[GroupMember], params: &ModelParams) -> ObjectiveVector {
    let g = group_satisfaction_with(trail, group, params);
    ObjectiveVector([
        g.avg,
        g.fairness,
        accessibility(trail.difficulty, params),
        1.0 - trail.distance_km / params.distance_ceiling_km,
        1.0 - trail.estimated_time_hours / params.time_ceiling_hours,
        g.consensus,
    ])
}

/// Pareto selector: non-dominated frontier ranked by a weighted score
#[derive(Debug, Clone, Default)]
pub struct ParetoSelector {
    pub weights: ScoringWeights,
    pub params: ModelParams,
}

impl ParetoSelector {
    pub fn new(weights: ScoringWeights) -> Self {
        Self {
            weights,
            params: ModelParams::default(),
        }
    }

    pub fn with_params(mut self, params: ModelParams) -> Self {
        self.params = params;
        self
    }

    /// Candidates that no other candidate dominates, in candidate order
    pub fn frontier<'t>(&self, candidates: &'t [Trail], group: &[GroupMember]) -> Vec<&'t Trail> {
        let vectors: Vec<ObjectiveVector> = candidates
            .par_iter()
            .map(|trail| objectives(trail, group, &self.params))
            .collect();

        skyline_indices(&vectors)
            .into_iter()
            .map(|i| &candidates[i])
            .collect()
    }

    /// Ranks `frontier` by weighted score and keeps the top `k`.
    ///
    /// A frontier no larger than `k` is returned unchanged and unranked.
    /// Equal scores keep their frontier order.
    pub fn rank<'t>(&self, frontier: Vec<&'t Trail>, group: &[GroupMember], k: usize) -> Vec<&'t Trail> {
        if frontier.len() <= k {
            return frontier;
        }

        let mut scored: Vec<(&Trail, f64)> = frontier
            .into_iter()
            .map(|trail| {
                let g = group_satisfaction_with(trail, group, &self.params);
                (trail, self.weights.score(&g))
            })
            .collect();

        // sort_by is stable; total_cmp keeps the order total when a score is NaN
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.into_iter().take(k).map(|(trail, _)| trail).collect()
    }

    pub fn select(&self, candidates: &[Trail], group: &[GroupMember], k: usize) -> Selection {
        let mut selection = Selection::empty(AlgorithmKind::ParetoWeighted, k, candidates.len());
        if k == 0 || candidates.is_empty() {
            return selection;
        }

        info!(
            event = "pareto_start",
            candidates = candidates.len(),
            members = group.len(),
            k = k,
        );

        let frontier = self.frontier(candidates, group);
        debug!(event = "pareto_frontier", frontier = frontier.len());
        selection.frontier_size = Some(frontier.len());

        selection.trails = self
            .rank(frontier, group, k)
            .into_iter()
            .cloned()
            .collect();

        info!(event = "pareto_end", selected = selection.len());
        selection
    }
}

impl GroupSelector for ParetoSelector {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::ParetoWeighted
    }

    fn select(&self, candidates: &[Trail], group: &[GroupMember], k: usize) -> Selection {
        ParetoSelector::select(self, candidates, group, k)
    }
}

/// Selects up to `k` trails from the Pareto frontier of `candidates`.
/// The result is smaller than `k` when the frontier is.
pub fn select_by_pareto_weighted(
    candidates: &[Trail],
    group: &[GroupMember],
    k: usize,
    weights: &ScoringWeights,
) -> Selection {
    ParetoSelector::new(*weights).select(candidates, group, k)
}
