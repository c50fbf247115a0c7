//! Tunable model constants and run configuration.
//!
//! Every numeric constant used by the scoring models lives in
//! [`ModelParams`], whose defaults are the named constants below. A whole
//! run can be described in TOML:
//!
//! ```
//! use group_trails::config::RecommenderConfig;
//!
//! let config = RecommenderConfig::from_toml_str(r#"
//!     k = 3
//!
//!     [greedy]
//!     consider_diversity = false
//!
//!     [pareto]
//!     avg = 0.5
//!     min = 0.5
//!     cons = 0.0
//! "#).unwrap();
//!
//! assert_eq!(config.k, 3);
//! assert!(!config.greedy.consider_diversity);
//! assert_eq!(config.model.distance_tolerance, 0.3);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithms::greedy_regret::GreedyOptions;
use crate::algorithms::pareto_weighted::ScoringWeights;
use crate::utils::catalog::TrailFilter;

/// Width of the Gaussian distance preference, relative to the preferred distance
pub const DISTANCE_TOLERANCE: f64 = 0.3;
/// Utility lost when a trail takes exactly the member's maximum time
pub const TIME_PENALTY: f64 = 50.0;
/// Utility lost when a trail climbs exactly the member's maximum elevation
pub const ELEVATION_PENALTY: f64 = 30.0;
/// Standard deviation at which consensus reaches zero
pub const CONSENSUS_DIVISOR: f64 = 30.0;
/// Distance at which the Pareto distance objective reaches zero
pub const DISTANCE_CEILING_KM: f64 = 50.0;
/// Walking time at which the Pareto time objective reaches zero
pub const TIME_CEILING_HOURS: f64 = 12.0;
/// Default number of trails to recommend
pub const DEFAULT_K: usize = 5;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Blend of the three group-satisfaction terms into a total score
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SatisfactionBlend {
    pub avg: f64,
    pub fairness: f64,
    pub consensus: f64,
}

impl Default for SatisfactionBlend {
    fn default() -> Self {
        Self {
            avg: 0.4,
            fairness: 0.3,
            consensus: 0.3,
        }
    }
}

/// Blend of the four trail-to-trail similarity terms
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimilarityBlend {
    pub scenery: f64,
    pub difficulty: f64,
    pub distance: f64,
    pub location: f64,
}

impl Default for SimilarityBlend {
    fn default() -> Self {
        Self {
            scenery: 0.4,
            difficulty: 0.2,
            distance: 0.2,
            location: 0.2,
        }
    }
}

/// Accessibility objective per difficulty grade
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Accessibility {
    pub easy: f64,
    pub moderate: f64,
    pub hard: f64,
}

impl Default for Accessibility {
    fn default() -> Self {
        Self {
            easy: 1.0,
            moderate: 0.7,
            hard: 0.4,
        }
    }
}

/// Constants of the utility, aggregation, similarity and objective models
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelParams {
    pub distance_tolerance: f64,
    pub time_penalty: f64,
    pub elevation_penalty: f64,
    pub consensus_divisor: f64,
    pub distance_ceiling_km: f64,
    pub time_ceiling_hours: f64,
    pub satisfaction: SatisfactionBlend,
    pub similarity: SimilarityBlend,
    pub accessibility: Accessibility,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            distance_tolerance: DISTANCE_TOLERANCE,
            time_penalty: TIME_PENALTY,
            elevation_penalty: ELEVATION_PENALTY,
            consensus_divisor: CONSENSUS_DIVISOR,
            distance_ceiling_km: DISTANCE_CEILING_KM,
            time_ceiling_hours: TIME_CEILING_HOURS,
            satisfaction: SatisfactionBlend::default(),
            similarity: SimilarityBlend::default(),
            accessibility: Accessibility::default(),
        }
    }
}

impl ModelParams {
    /// Rejects divisors that would make the models divide by zero and
    /// negative blend weights
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("distance_tolerance", self.distance_tolerance),
            ("consensus_divisor", self.consensus_divisor),
            ("distance_ceiling_km", self.distance_ceiling_km),
            ("time_ceiling_hours", self.time_ceiling_hours),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "model.{} must be positive, got {}",
                    name, value
                )));
            }
        }

        let blends = [
            ("satisfaction.avg", self.satisfaction.avg),
            ("satisfaction.fairness", self.satisfaction.fairness),
            ("satisfaction.consensus", self.satisfaction.consensus),
            ("similarity.scenery", self.similarity.scenery),
            ("similarity.difficulty", self.similarity.difficulty),
            ("similarity.distance", self.similarity.distance),
            ("similarity.location", self.similarity.location),
            ("time_penalty", self.time_penalty),
            ("elevation_penalty", self.elevation_penalty),
        ];
        if let Some((name, value)) = blends.iter().find(|(_, v)| !(*v >= 0.0)) {
            return Err(ConfigError::Invalid(format!(
                "model.{} must be non-negative, got {}",
                name, value
            )));
        }

        Ok(())
    }
}

/// Complete configuration of a recommendation run
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RecommenderConfig {
    /// Number of trails to recommend
    pub k: usize,

    /// Rescale each member's weights to sum to 1 instead of rejecting them
    pub normalize_weights: bool,

    pub model: ModelParams,

    pub greedy: GreedyOptions,

    pub pareto: ScoringWeights,

    /// Caller-side candidate filter applied to the catalog
    pub filter: TrailFilter,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            k: DEFAULT_K,
            normalize_weights: false,
            model: ModelParams::default(),
            greedy: GreedyOptions::default(),
            pareto: ScoringWeights::default(),
            filter: TrailFilter::default(),
        }
    }
}

impl RecommenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, contains invalid TOML or
    /// fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.model.validate()?;
        if self.greedy.diversity_weight < 0.0 || self.greedy.regret_weight < 0.0 {
            return Err(ConfigError::Invalid(
                "greedy weights must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }
}
