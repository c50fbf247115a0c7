// Selection model: the ordered output of one selector run

use crate::models::{Trail, TrailId};
use serde::Serialize;
use std::fmt;

/// Which selection algorithm produced a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AlgorithmKind {
    GreedyMinMaxRegret,
    ParetoWeighted,
}

impl fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmKind::GreedyMinMaxRegret => f.write_str("Greedy MinMax Regret"),
            AlgorithmKind::ParetoWeighted => f.write_str("Pareto Weighted Scoring"),
        }
    }
}

/// Ordered, duplicate-free list of at most `k` trails
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    /// Selected trails, best first
    pub trails: Vec<Trail>,

    /// Algorithm that produced this selection
    pub algorithm: AlgorithmKind,

    /// Requested size
    pub k: usize,

    /// Number of candidates the selector chose from
    pub candidate_count: usize,

    /// Final minimax regret against the candidate pool (greedy only)
    pub max_regret: Option<f64>,

    /// Size of the non-dominated frontier (Pareto only)
    pub frontier_size: Option<usize>,
}

impl Selection {
    /// Creates an empty selection
    pub fn empty(algorithm: AlgorithmKind, k: usize, candidate_count: usize) -> Self {
        Self {
            trails: Vec::new(),
            algorithm,
            k,
            candidate_count,
            max_regret: None,
            frontier_size: None,
        }
    }

    pub fn len(&self) -> usize {
        self.trails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trails.is_empty()
    }

    pub fn ids(&self) -> Vec<&TrailId> {
        self.trails.iter().map(|t| &t.id).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.trails.iter().any(|t| t.id == id)
    }

    pub fn into_trails(self) -> Vec<Trail> {
        self.trails
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;

    #[test]
    fn test_empty_selection() {
        let selection = Selection::empty(AlgorithmKind::ParetoWeighted, 5, 0);
        assert!(selection.is_empty());
        assert_eq!(selection.len(), 0);
        assert_eq!(selection.max_regret, None);
    }

    #[test]
    fn test_ids_and_contains() {
        let mut selection = Selection::empty(AlgorithmKind::GreedyMinMaxRegret, 2, 3);
        selection
            .trails
            .push(Trail::new("a", Difficulty::Easy, 1.0, 1.0, 10));
        selection
            .trails
            .push(Trail::new("b", Difficulty::Hard, 9.0, 4.0, 800));

        assert_eq!(selection.ids(), vec!["a", "b"]);
        assert!(selection.contains("b"));
        assert!(!selection.contains("c"));
        assert_eq!(
            AlgorithmKind::GreedyMinMaxRegret.to_string(),
            "Greedy MinMax Regret"
        );
    }
}
