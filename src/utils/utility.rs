// Per-member utility model: how much one member would enjoy one trail

use crate::config::ModelParams;
use crate::models::{GroupMember, Trail, Utility};
use std::collections::HashSet;

/// Upper bound of every utility score
pub const MAX_UTILITY: Utility = 100.0;

/// Weighted contribution of each criterion before the cap is applied
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UtilityBreakdown {
    pub difficulty: f64,
    pub distance: f64,
    pub time: f64,
    pub elevation: f64,
    pub scenery: f64,
}

impl UtilityBreakdown {
    /// Sum of the weighted components, uncapped
    pub fn raw_total(&self) -> f64 {
        self.difficulty + self.distance + self.time + self.elevation + self.scenery
    }

    /// Utility in [0, 100]; overshoot from out-of-contract weights is absorbed
    pub fn total(&self) -> Utility {
        self.raw_total().min(MAX_UTILITY)
    }
}

/// Gaussian preference in [0, 1] for a trail of length `actual` when
/// `preferred` is wanted. A preferred length of zero only accepts zero.
pub fn gaussian_preference(actual: f64, preferred: f64, tolerance: f64) -> f64 {
    if preferred == 0.0 {
        return if actual == 0.0 { 1.0 } else { 0.0 };
    }
    let d = (actual - preferred).abs() / preferred;
    (-(d * d) / (2.0 * tolerance * tolerance)).exp()
}

/// Case-insensitive Jaccard similarity of two tag lists, 0 when both are empty
pub fn jaccard<A, B>(a: &[A], b: &[B]) -> f64
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let a: HashSet<String> = a.iter().map(|s| s.as_ref().to_lowercase()).collect();
    let b: HashSet<String> = b.iter().map(|s| s.as_ref().to_lowercase()).collect();
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Linear score that falls from 100 to `100 - penalty` as `value` approaches
/// `limit`, and drops to 0 beyond it
fn linear_limit_score(value: f64, limit: f64, penalty: f64) -> f64 {
    if value <= limit {
        100.0 - penalty * (value / limit)
    } else {
        0.0
    }
}

/// Per-criterion weighted scores of `trail` for `member`
pub fn utility_breakdown(member: &GroupMember, trail: &Trail, params: &ModelParams) -> UtilityBreakdown {
    let difficulty = if member.acceptable_difficulties.contains(&trail.difficulty) {
        100.0
    } else {
        0.0
    };

    let distance = gaussian_preference(
        trail.distance_km,
        member.preferred_distance,
        params.distance_tolerance,
    ) * 100.0;

    let time = linear_limit_score(trail.estimated_time_hours, member.max_time, params.time_penalty);

    let elevation = linear_limit_score(
        f64::from(trail.elevation_gain_m),
        member.max_elevation,
        params.elevation_penalty,
    );

    let scenery = if member.preferred_scenery_types.is_empty() {
        0.0
    } else {
        member.scenery_weight * jaccard(&trail.scenery_types, &member.preferred_scenery_types) * 100.0
    };

    UtilityBreakdown {
        difficulty: member.difficulty_weight * difficulty,
        distance: member.distance_weight * distance,
        time: member.time_weight * time,
        elevation: member.elevation_weight * elevation,
        scenery,
    }
}

/// Satisfaction of `member` with `trail`, in [0, 100], using `params`
pub fn individual_utility_with(member: &GroupMember, trail: &Trail, params: &ModelParams) -> Utility {
    utility_breakdown(member, trail, params).total()
}

/// Satisfaction of `member` with `trail`, in [0, 100]
///
/// Preconditions (not checked): positive `max_time` and `max_elevation`,
/// weights in [0, 1] summing to 1. See [`GroupMember::validate`].
pub fn individual_utility(member: &GroupMember, trail: &Trail) -> Utility {
    individual_utility_with(member, trail, &ModelParams::default())
}
