// Public modules
pub mod algorithms;
pub mod config;
pub mod error;
pub mod models;
pub mod utils;

// Re-exports for convenience
pub use algorithms::greedy_regret::{select_by_greedy_regret, GreedyOptions, GreedyRegretSelector};
pub use algorithms::pareto_weighted::{select_by_pareto_weighted, ParetoSelector, ScoringWeights};
pub use algorithms::GroupSelector;
pub use config::{ModelParams, RecommenderConfig};
pub use error::{Error, Result};
pub use models::{AlgorithmKind, Difficulty, GroupMember, Selection, Trail, TrailType};
pub use utils::catalog::{Catalog, TrailFilter};
pub use utils::regret::regret;
pub use utils::satisfaction::{group_satisfaction, GroupSatisfaction};
pub use utils::similarity::{diversity, trail_similarity};
pub use utils::utility::individual_utility;
