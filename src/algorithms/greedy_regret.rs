use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::algorithms::GroupSelector;
use crate::config::ModelParams;
use crate::models::{AlgorithmKind, GroupMember, Selection, Trail};
use crate::utils::regret::RegretEvaluator;
use crate::utils::similarity::diversity_with;

/// Options of the greedy minimax-regret selector
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GreedyOptions {
    /// Blend normalized regret with set diversity instead of minimizing raw regret
    pub consider_diversity: bool,
    pub diversity_weight: f64,
    pub regret_weight: f64,
}

impl Default for GreedyOptions {
    fn default() -> Self {
        Self {
            consider_diversity: true,
            diversity_weight: 0.3,
            regret_weight: 0.7,
        }
    }
}

impl GreedyOptions {
    /// Pure regret minimization, no diversity term
    pub fn regret_only() -> Self {
        Self {
            consider_diversity: false,
            ..Self::default()
        }
    }
}

/// Score of one trial selection; larger is better
#[derive(Debug, Clone, Copy)]
struct TrialScore {
    regret: f64,
    score: f64,
}

/// Greedy minimax-regret selector with optional diversity blending
#[derive(Debug, Clone, Default)]
pub struct GreedyRegretSelector {
    pub options: GreedyOptions,
    pub params: ModelParams,
}

impl GreedyRegretSelector {
    pub fn new(options: GreedyOptions) -> Self {
        Self {
            options,
            params: ModelParams::default(),
        }
    }

    pub fn with_params(mut self, params: ModelParams) -> Self {
        self.params = params;
        self
    }

    /// Builds a selection of up to `k` trails one pick at a time.
    ///
    /// Each step tries every remaining candidate appended to the current
    /// selection and measures the minimax regret of that trial against the
    /// whole candidate pool. With diversity enabled the trial score is
    /// `regret_weight * (1 - regret / (|group| * k)) + diversity_weight * diversity`
    /// and the highest score wins; otherwise the lowest regret wins. Ties go
    /// to the candidate that comes first in the remaining candidate order.
    pub fn select(&self, candidates: &[Trail], group: &[GroupMember], k: usize) -> Selection {
        let mut selection = Selection::empty(AlgorithmKind::GreedyMinMaxRegret, k, candidates.len());
        if k == 0 || candidates.is_empty() {
            return selection;
        }

        info!(
            event = "greedy_start",
            candidates = candidates.len(),
            members = group.len(),
            k = k,
            consider_diversity = self.options.consider_diversity,
        );

        let evaluator = RegretEvaluator::new(candidates, group, &self.params);
        let normalizer = (group.len() * k) as f64;

        let mut selected: Vec<usize> = Vec::with_capacity(k);
        let mut available: Vec<usize> = (0..candidates.len()).collect();
        let mut sums = vec![0.0; group.len()];
        let mut last_regret = 0.0;

        while selected.len() < k && !available.is_empty() {
            let scores: Vec<TrialScore> = available
                .par_iter()
                .map(|&candidate| {
                    let regret = evaluator.regret_with_candidate(&sums, selected.len(), candidate);
                    let score = if self.options.consider_diversity {
                        let trial: Vec<&Trail> = selected
                            .iter()
                            .chain(std::iter::once(&candidate))
                            .map(|&i| &candidates[i])
                            .collect();
                        self.options.regret_weight * (1.0 - regret / normalizer)
                            + self.options.diversity_weight * diversity_with(&trial, &self.params)
                    } else {
                        -regret
                    };
                    TrialScore { regret, score }
                })
                .collect();

            // Sequential reduction keeps the first-encountered winner on ties
            let mut best = 0;
            for (pos, trial) in scores.iter().enumerate().skip(1) {
                if trial.score > scores[best].score {
                    best = pos;
                }
            }

            let winner = available.remove(best);
            for (m, sum) in sums.iter_mut().enumerate() {
                *sum += evaluator.utility(m, winner);
            }
            selected.push(winner);
            last_regret = scores[best].regret;

            debug!(
                event = "greedy_step",
                step = selected.len(),
                trail = %candidates[winner].id,
                score = scores[best].score,
                regret = last_regret,
            );
        }

        selection.trails = selected.iter().map(|&i| candidates[i].clone()).collect();
        selection.max_regret = Some(last_regret);

        info!(
            event = "greedy_end",
            selected = selection.len(),
            max_regret = last_regret,
        );

        selection
    }
}

impl GroupSelector for GreedyRegretSelector {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::GreedyMinMaxRegret
    }

    fn select(&self, candidates: &[Trail], group: &[GroupMember], k: usize) -> Selection {
        GreedyRegretSelector::select(self, candidates, group, k)
    }
}

/// Selects up to `k` trails by greedy minimax regret against `candidates`
pub fn select_by_greedy_regret(
    candidates: &[Trail],
    group: &[GroupMember],
    k: usize,
    options: &GreedyOptions,
) -> Selection {
    GreedyRegretSelector::new(*options).select(candidates, group, k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;
    use crate::utils::regret::regret;
    use std::collections::HashSet;

    fn create_test_trails() -> Vec<Trail> {
        vec![
            Trail::new("lake", Difficulty::Easy, 5.0, 2.0, 100)
                .with_location("Whistler, BC")
                .with_scenery(["Lake", "Forest"]),
            Trail::new("ridge", Difficulty::Hard, 18.0, 8.0, 820)
                .with_location("Whistler, BC")
                .with_scenery(["Alpine", "Mountain views"]),
            Trail::new("beach", Difficulty::Easy, 1.4, 0.8, 100)
                .with_location("Olympic Peninsula, WA")
                .with_scenery(["Beach", "Ocean"]),
            Trail::new("loop", Difficulty::Easy, 5.0, 2.0, 100)
                .with_location("Whistler, BC")
                .with_scenery(["Lake", "Forest"]),
            Trail::new("falls", Difficulty::Moderate, 11.0, 4.0, 400)
                .with_location("Pemberton, BC")
                .with_scenery(["Lakes", "Glaciers", "Alpine"]),
        ]
    }

    fn create_test_group() -> Vec<GroupMember> {
        vec![
            GroupMember::new([Difficulty::Easy], 5.0, 3.0, 300.0),
            GroupMember::new([Difficulty::Moderate, Difficulty::Hard], 15.0, 9.0, 1000.0),
        ]
    }

    #[test]
    fn test_single_member_prefers_matching_trail() {
        let group = vec![GroupMember::new([Difficulty::Easy], 5.0, 3.0, 300.0)
            .with_weights(0.2, 0.2, 0.2, 0.2, 0.0)];
        let trails = vec![
            Trail::new("t1", Difficulty::Easy, 5.0, 2.0, 100),
            Trail::new("t2", Difficulty::Hard, 20.0, 8.0, 900),
        ];

        for options in [GreedyOptions::default(), GreedyOptions::regret_only()] {
            let selection = select_by_greedy_regret(&trails, &group, 1, &options);
            assert_eq!(selection.ids(), vec!["t1"]);
            assert_eq!(selection.max_regret, Some(0.0));
        }
    }

    #[test]
    fn test_size_and_uniqueness() {
        let trails = create_test_trails();
        let group = create_test_group();

        for k in 0..8 {
            let selection = select_by_greedy_regret(&trails, &group, k, &GreedyOptions::default());
            assert_eq!(selection.len(), k.min(trails.len()));
            let ids: HashSet<_> = selection.ids().into_iter().collect();
            assert_eq!(ids.len(), selection.len());
        }
    }

    #[test]
    fn test_empty_inputs() {
        let group = create_test_group();
        let selection = select_by_greedy_regret(&[], &group, 3, &GreedyOptions::default());
        assert!(selection.is_empty());

        let selection = select_by_greedy_regret(&create_test_trails(), &group, 0, &GreedyOptions::default());
        assert!(selection.is_empty());
        assert_eq!(selection.max_regret, None);
    }

    #[test]
    fn test_diversity_avoids_near_duplicates() {
        let trails = create_test_trails();
        let group = vec![GroupMember::new([Difficulty::Easy], 5.0, 3.0, 300.0)];

        // Utilities are on a 0-100 scale, so any regret weight dwarfs the
        // diversity term; isolate diversity to observe it
        let options = GreedyOptions {
            consider_diversity: true,
            diversity_weight: 1.0,
            regret_weight: 0.0,
        };
        let selection = select_by_greedy_regret(&trails, &group, 2, &options);
        assert_eq!(selection.trails[0].id, "lake");
        assert_eq!(selection.trails[1].id, "falls");

        // Without diversity the identical twin is the regret-optimal second pick
        let selection = select_by_greedy_regret(&trails, &group, 2, &GreedyOptions::regret_only());
        assert_eq!(selection.ids(), vec!["lake", "loop"]);
    }

    #[test]
    fn test_ties_go_to_first_candidate() {
        let twin_a = Trail::new("a", Difficulty::Easy, 5.0, 2.0, 100);
        let twin_b = Trail::new("b", Difficulty::Easy, 5.0, 2.0, 100);
        let group = vec![GroupMember::new([Difficulty::Easy], 5.0, 3.0, 300.0)];

        let selection = select_by_greedy_regret(
            &[twin_b.clone(), twin_a.clone()],
            &group,
            1,
            &GreedyOptions::regret_only(),
        );
        assert_eq!(selection.ids(), vec!["b"]);
    }

    #[test]
    fn test_reported_regret_matches_evaluator() {
        let trails = create_test_trails();
        let group = create_test_group();
        let selection = select_by_greedy_regret(&trails, &group, 3, &GreedyOptions::default());

        let direct = regret(&selection.trails, &trails, &group);
        assert!((selection.max_regret.unwrap() - direct).abs() < 1e-9);
    }
}
