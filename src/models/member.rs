// Group member model: individual preferences, constraints and criterion weights

use crate::models::{Difficulty, Hours, Kilometers};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Allowed deviation of the five criterion weights from a sum of 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Boundary validation failures for a group description.
///
/// The scoring core never raises these; callers validate before invoking it.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    #[error("group has no members")]
    EmptyGroup,

    #[error("{member}: acceptable difficulties must not be empty")]
    NoAcceptableDifficulties { member: String },

    #[error("{member}: {field} must be positive, got {value}")]
    NonPositive {
        member: String,
        field: &'static str,
        value: f64,
    },

    #[error("{member}: {field} must lie in [0, 1], got {value}")]
    WeightOutOfRange {
        member: String,
        field: &'static str,
        value: f64,
    },

    #[error("{member}: criterion weights must sum to 1.0, got {sum}")]
    WeightSum { member: String, sum: f64 },
}

/// One member of a hiking group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    /// Display name, used only when reporting results back
    #[serde(default)]
    pub name: Option<String>,

    /// Difficulty grades this member accepts
    pub acceptable_difficulties: BTreeSet<Difficulty>,

    /// Preferred trail length
    pub preferred_distance: Kilometers,

    #[serde(default)]
    pub preferred_elevation: Option<f64>,

    #[serde(default)]
    pub preferred_time: Option<Hours>,

    /// Longest acceptable walking time
    pub max_time: Hours,

    /// Largest acceptable elevation gain in meters
    pub max_elevation: f64,

    /// Scenery this member enjoys; empty disables the scenery criterion
    #[serde(default)]
    pub preferred_scenery_types: Vec<String>,

    pub difficulty_weight: f64,
    pub distance_weight: f64,
    pub time_weight: f64,
    pub elevation_weight: f64,
    #[serde(default)]
    pub scenery_weight: f64,
}

impl GroupMember {
    /// Creates a member with equal weights on difficulty, distance, time and
    /// elevation and no scenery preference
    pub fn new<I>(
        acceptable_difficulties: I,
        preferred_distance: Kilometers,
        max_time: Hours,
        max_elevation: f64,
    ) -> Self
    where
        I: IntoIterator<Item = Difficulty>,
    {
        Self {
            name: None,
            acceptable_difficulties: acceptable_difficulties.into_iter().collect(),
            preferred_distance,
            preferred_elevation: None,
            preferred_time: None,
            max_time,
            max_elevation,
            preferred_scenery_types: Vec::new(),
            difficulty_weight: 0.25,
            distance_weight: 0.25,
            time_weight: 0.25,
            elevation_weight: 0.25,
            scenery_weight: 0.0,
        }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the five criterion weights in the order
    /// difficulty, distance, time, elevation, scenery
    pub fn with_weights(
        mut self,
        difficulty: f64,
        distance: f64,
        time: f64,
        elevation: f64,
        scenery: f64,
    ) -> Self {
        self.difficulty_weight = difficulty;
        self.distance_weight = distance;
        self.time_weight = time;
        self.elevation_weight = elevation;
        self.scenery_weight = scenery;
        self
    }

    pub fn with_scenery<I, S>(mut self, scenery: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_scenery_types = scenery.into_iter().map(Into::into).collect();
        self
    }

    /// Criterion weights as (field name, value) pairs
    pub fn weights(&self) -> [(&'static str, f64); 5] {
        [
            ("difficulty_weight", self.difficulty_weight),
            ("distance_weight", self.distance_weight),
            ("time_weight", self.time_weight),
            ("elevation_weight", self.elevation_weight),
            ("scenery_weight", self.scenery_weight),
        ]
    }

    pub fn weight_sum(&self) -> f64 {
        self.weights().iter().map(|(_, w)| w).sum()
    }

    /// Name for error messages and reports
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("member {}", index + 1),
        }
    }

    /// Checks the preconditions the scoring core relies on
    pub fn validate(&self, index: usize) -> Result<(), ValidationError> {
        let member = self.label(index);

        if self.acceptable_difficulties.is_empty() {
            return Err(ValidationError::NoAcceptableDifficulties { member });
        }

        for (field, value) in [
            ("preferred_distance", self.preferred_distance),
            ("max_time", self.max_time),
            ("max_elevation", self.max_elevation),
        ] {
            if !(value > 0.0) {
                return Err(ValidationError::NonPositive {
                    member,
                    field,
                    value,
                });
            }
        }

        for (field, value) in self.weights() {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::WeightOutOfRange {
                    member,
                    field,
                    value,
                });
            }
        }

        let sum = self.weight_sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ValidationError::WeightSum { member, sum });
        }

        Ok(())
    }

    /// Returns a copy whose five weights are rescaled to sum to 1.0.
    /// All-zero weights are returned unchanged.
    pub fn normalized(&self) -> Self {
        let sum = self.weight_sum();
        let mut member = self.clone();
        if sum > 0.0 {
            member.difficulty_weight /= sum;
            member.distance_weight /= sum;
            member.time_weight /= sum;
            member.elevation_weight /= sum;
            member.scenery_weight /= sum;
        }
        member
    }

    /// Validates every member of a group, failing on the first violation
    pub fn validate_group(group: &[GroupMember]) -> Result<(), ValidationError> {
        if group.is_empty() {
            return Err(ValidationError::EmptyGroup);
        }
        group
            .iter()
            .enumerate()
            .try_for_each(|(index, member)| member.validate(index))
    }
}
