// Trail model representing a normalized catalog record

use crate::models::{Hours, Kilometers, Meters, TrailId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Difficulty grade of a trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Moderate, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Moderate => "Moderate",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Route shape of a trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TrailType {
    Loop,
    #[serde(rename = "Out & Back")]
    OutAndBack,
    #[serde(rename = "Point-to-Point")]
    PointToPoint,
}

impl TrailType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrailType::Loop => "Loop",
            TrailType::OutAndBack => "Out & Back",
            TrailType::PointToPoint => "Point-to-Point",
        }
    }
}

impl fmt::Display for TrailType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A hiking trail as consumed by the recommendation core.
///
/// Trails are immutable once loaded. Numeric fields are non-negative; a
/// rating the source did not provide stays `None` rather than becoming zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trail {
    /// Unique identifier of the trail
    pub id: TrailId,

    /// Display name
    pub name: String,

    /// Display location, also compared verbatim by the similarity model
    pub location: String,

    pub difficulty: Difficulty,

    pub distance_km: Kilometers,

    pub estimated_time_hours: Hours,

    pub elevation_gain_m: Meters,

    /// Average rating in [0, 5], if known
    #[serde(default)]
    pub rating: Option<f64>,

    /// Scenery tags, compared case-insensitively
    #[serde(default)]
    pub scenery_types: Vec<String>,

    pub trail_type: TrailType,
}

impl Trail {
    /// Creates a trail with the fields the scoring models read.
    /// Display fields start empty and the rating starts unknown.
    pub fn new<S: Into<String>>(
        id: S,
        difficulty: Difficulty,
        distance_km: Kilometers,
        estimated_time_hours: Hours,
        elevation_gain_m: Meters,
    ) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            location: String::new(),
            difficulty,
            distance_km,
            estimated_time_hours,
            elevation_gain_m,
            rating: None,
            scenery_types: Vec::new(),
            trail_type: TrailType::Loop,
        }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_location<S: Into<String>>(mut self, location: S) -> Self {
        self.location = location.into();
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_scenery<I, S>(mut self, scenery: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scenery_types = scenery.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_trail_type(mut self, trail_type: TrailType) -> Self {
        self.trail_type = trail_type;
        self
    }
}

impl AsRef<Trail> for Trail {
    fn as_ref(&self) -> &Trail {
        self
    }
}
