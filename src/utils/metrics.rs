// Recommendation metrics and side-by-side algorithm comparison

use serde::Serialize;
use std::collections::BTreeMap;

use crate::config::ModelParams;
use crate::models::{AlgorithmKind, Difficulty, GroupMember, Selection, Trail, TrailId, Utility};
use crate::utils::regret::regret_with;
use crate::utils::satisfaction::{member_utilities, GroupSatisfaction};
use crate::utils::similarity::diversity_with;

/// Utility above which a member counts a trail as a match
pub const MATCH_THRESHOLD: Utility = 50.0;

/// Comparison scores closer than this are a tie
const TIE_EPSILON: f64 = 1e-9;

/// Pool the reported regret is measured against
#[derive(Debug, Clone, Copy)]
pub enum RegretBaseline<'a> {
    /// The candidate pool the selection was drawn from
    CandidatePool(&'a [Trail]),
    /// The selection itself. A selection is always its own best subset,
    /// so this baseline reports zero for any non-empty selection.
    SelectionItself,
}

/// Per-trail breakdown of member utilities and group statistics
#[derive(Debug, Clone, Serialize)]
pub struct TrailReport {
    pub trail_id: TrailId,
    pub member_utilities: Vec<Utility>,
    pub average_utility: Utility,
    pub satisfaction: GroupSatisfaction,
}

impl TrailReport {
    pub fn new(trail: &Trail, group: &[GroupMember], params: &ModelParams) -> Self {
        let member_utilities = member_utilities(trail, group, params);
        let satisfaction = GroupSatisfaction::from_scores(&member_utilities, params);
        Self {
            trail_id: trail.id.clone(),
            average_utility: satisfaction.avg,
            member_utilities,
            satisfaction,
        }
    }
}

/// How well a selection serves one member
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberMetrics {
    pub member: String,
    /// Mean utility over the selection, rounded to a whole percentage
    pub average_utility: f64,
    /// Share of selected trails with utility above [`MATCH_THRESHOLD`], as a rounded percentage
    pub match_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationMetrics {
    pub algorithm: AlgorithmKind,
    pub total_trails: usize,
    /// Mean over selected trails with a known rating
    pub average_rating: Option<f64>,
    pub average_distance: Option<f64>,
    pub average_time: Option<f64>,
    pub average_elevation: Option<f64>,
    pub members: Vec<MemberMetrics>,
    pub group_satisfaction: Option<f64>,
    pub fairness: Option<f64>,
    pub consensus: Option<f64>,
    pub diversity: f64,
    pub regret: f64,
    pub difficulty_distribution: BTreeMap<Difficulty, usize>,
    pub scenery_distribution: BTreeMap<String, usize>,
    pub trails: Vec<TrailReport>,
}

fn mean<I: Iterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

impl RecommendationMetrics {
    pub fn compute(selection: &Selection, group: &[GroupMember], baseline: RegretBaseline<'_>) -> Self {
        Self::compute_with(selection, group, baseline, &ModelParams::default())
    }

    /// Metrics of `selection` for a validated, non-empty `group`
    pub fn compute_with(
        selection: &Selection,
        group: &[GroupMember],
        baseline: RegretBaseline<'_>,
        params: &ModelParams,
    ) -> Self {
        let trails = &selection.trails;
        let reports: Vec<TrailReport> = trails
            .iter()
            .map(|trail| TrailReport::new(trail, group, params))
            .collect();

        let members = group
            .iter()
            .enumerate()
            .map(|(m, member)| {
                let utilities: Vec<Utility> = reports.iter().map(|r| r.member_utilities[m]).collect();
                let matches = utilities.iter().filter(|&&u| u > MATCH_THRESHOLD).count();
                MemberMetrics {
                    member: member.label(m),
                    average_utility: mean(utilities.iter().copied()).unwrap_or(0.0).round(),
                    match_percentage: if utilities.is_empty() {
                        0.0
                    } else {
                        (matches as f64 / utilities.len() as f64 * 100.0).round()
                    },
                }
            })
            .collect();

        let regret = match baseline {
            RegretBaseline::CandidatePool(pool) => regret_with(trails, pool, group, params),
            RegretBaseline::SelectionItself => regret_with(trails, trails, group, params),
        };

        let mut difficulty_distribution = BTreeMap::new();
        let mut scenery_distribution = BTreeMap::new();
        for trail in trails {
            *difficulty_distribution.entry(trail.difficulty).or_insert(0) += 1;
            for tag in &trail.scenery_types {
                *scenery_distribution.entry(tag.clone()).or_insert(0) += 1;
            }
        }

        Self {
            algorithm: selection.algorithm,
            total_trails: trails.len(),
            average_rating: mean(trails.iter().filter_map(|t| t.rating)),
            average_distance: mean(trails.iter().map(|t| t.distance_km)),
            average_time: mean(trails.iter().map(|t| t.estimated_time_hours)),
            average_elevation: mean(trails.iter().map(|t| f64::from(t.elevation_gain_m))),
            members,
            group_satisfaction: mean(reports.iter().map(|r| r.satisfaction.avg)),
            fairness: mean(reports.iter().map(|r| r.satisfaction.fairness)),
            consensus: mean(reports.iter().map(|r| r.satisfaction.consensus)),
            diversity: diversity_with(trails, params),
            regret,
            difficulty_distribution,
            scenery_distribution,
            trails: reports,
        }
    }
}

/// Which side of a comparison did better on one criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Winner {
    First,
    Second,
    Neither,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriterionResult {
    pub criterion: &'static str,
    pub first: f64,
    pub second: f64,
    pub winner: Winner,
}

impl CriterionResult {
    fn new(criterion: &'static str, first: Option<f64>, second: Option<f64>) -> Self {
        let first = first.unwrap_or(0.0);
        let second = second.unwrap_or(0.0);
        let winner = if (first - second).abs() <= TIE_EPSILON {
            Winner::Neither
        } else if first > second {
            Winner::First
        } else {
            Winner::Second
        };
        Self {
            criterion,
            first,
            second,
            winner,
        }
    }
}

/// Side-by-side comparison of two selections for the same group
#[derive(Debug, Clone, Serialize)]
pub struct AlgorithmComparison {
    pub first: AlgorithmKind,
    pub second: AlgorithmKind,
    /// Trail ids present in both selections, in the order of the first
    pub overlap: Vec<TrailId>,
    pub criteria: Vec<CriterionResult>,
}

impl AlgorithmComparison {
    pub fn compare(first: &Selection, second: &Selection, group: &[GroupMember]) -> Self {
        Self::compare_with(first, second, group, &ModelParams::default())
    }

    pub fn compare_with(first: &Selection, second: &Selection, group: &[GroupMember], params: &ModelParams) -> Self {
        let a = RecommendationMetrics::compute_with(first, group, RegretBaseline::SelectionItself, params);
        let b = RecommendationMetrics::compute_with(second, group, RegretBaseline::SelectionItself, params);

        let overlap = first
            .trails
            .iter()
            .filter(|t| second.contains(&t.id))
            .map(|t| t.id.clone())
            .collect();

        Self {
            first: first.algorithm,
            second: second.algorithm,
            overlap,
            criteria: vec![
                CriterionResult::new("average_satisfaction", a.group_satisfaction, b.group_satisfaction),
                CriterionResult::new("fairness", a.fairness, b.fairness),
                CriterionResult::new("consensus", a.consensus, b.consensus),
            ],
        }
    }

    /// Criteria won by each side, ties excluded
    pub fn wins(&self) -> (usize, usize) {
        self.criteria.iter().fold((0, 0), |(a, b), c| match c.winner {
            Winner::First => (a + 1, b),
            Winner::Second => (a, b + 1),
            Winner::Neither => (a, b),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_group() -> Vec<GroupMember> {
        vec![
            GroupMember::new([Difficulty::Easy], 5.0, 3.0, 300.0).with_name("kid"),
            GroupMember::new([Difficulty::Easy, Difficulty::Moderate], 8.0, 5.0, 600.0),
        ]
    }

    fn create_test_selection(algorithm: AlgorithmKind, trails: Vec<Trail>) -> Selection {
        let mut selection = Selection::empty(algorithm, trails.len(), trails.len());
        selection.trails = trails;
        selection
    }

    fn create_test_trails() -> Vec<Trail> {
        vec![
            Trail::new("lake", Difficulty::Easy, 5.0, 2.0, 100)
                .with_rating(4.5)
                .with_scenery(["Lake", "Forest"]),
            Trail::new("peak", Difficulty::Hard, 18.0, 8.0, 1200).with_scenery(["Alpine", "Lake"]),
        ]
    }

    #[test]
    fn test_compute_metrics() {
        let group = create_test_group();
        let trails = create_test_trails();
        let selection = create_test_selection(AlgorithmKind::GreedyMinMaxRegret, trails.clone());
        let metrics = RecommendationMetrics::compute(&selection, &group, RegretBaseline::CandidatePool(&trails));

        assert_eq!(metrics.total_trails, 2);
        // Unknown ratings are excluded, not counted as zero
        assert_eq!(metrics.average_rating, Some(4.5));
        assert_eq!(metrics.average_distance, Some(11.5));
        assert_eq!(metrics.members[0].member, "kid");
        assert_eq!(metrics.members[1].member, "member 2");
        // Every member likes the lake and nobody can reach the peak
        assert_eq!(metrics.members[0].match_percentage, 50.0);
        assert_eq!(metrics.difficulty_distribution.get(&Difficulty::Hard), Some(&1));
        assert_eq!(metrics.scenery_distribution.get("Lake"), Some(&2));
        assert_eq!(metrics.regret, 0.0);
        assert_eq!(metrics.trails.len(), 2);
    }

    #[test]
    fn test_regret_baseline_matters() {
        let group = create_test_group();
        let trails = create_test_trails();
        let selection = create_test_selection(AlgorithmKind::ParetoWeighted, vec![trails[1].clone()]);

        let pooled = RecommendationMetrics::compute(&selection, &group, RegretBaseline::CandidatePool(&trails));
        let own = RecommendationMetrics::compute(&selection, &group, RegretBaseline::SelectionItself);
        assert!(pooled.regret > 0.0);
        assert_eq!(own.regret, 0.0);
    }

    #[test]
    fn test_empty_selection() {
        let group = create_test_group();
        let selection = Selection::empty(AlgorithmKind::ParetoWeighted, 3, 0);
        let metrics = RecommendationMetrics::compute(&selection, &group, RegretBaseline::SelectionItself);
        assert_eq!(metrics.total_trails, 0);
        assert_eq!(metrics.group_satisfaction, None);
        assert_eq!(metrics.members[0].match_percentage, 0.0);
        assert_eq!(metrics.diversity, 1.0);
    }

    #[test]
    fn test_comparison() {
        let group = create_test_group();
        let trails = create_test_trails();
        let a = create_test_selection(AlgorithmKind::GreedyMinMaxRegret, vec![trails[0].clone()]);
        let b = create_test_selection(AlgorithmKind::ParetoWeighted, trails.clone());

        let comparison = AlgorithmComparison::compare(&a, &b, &group);
        assert_eq!(comparison.overlap, vec!["lake".to_string()]);
        assert_eq!(comparison.criteria[0].winner, Winner::First);
        assert_eq!(comparison.criteria[1].winner, Winner::First);

        let same = AlgorithmComparison::compare(&a, &a, &group);
        assert_eq!(same.wins(), (0, 0));
        assert!(same.criteria.iter().all(|c| c.winner == Winner::Neither));
    }

    #[test]
    fn test_trail_report() {
        let group = create_test_group();
        let report = TrailReport::new(&create_test_trails()[0], &group, &ModelParams::default());
        assert_eq!(report.trail_id, "lake");
        assert_eq!(report.member_utilities.len(), 2);
        assert_eq!(report.average_utility, report.satisfaction.avg);
    }
}
