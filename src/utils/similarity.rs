// Trail similarity and set diversity

use crate::config::ModelParams;
use crate::models::Trail;
use crate::utils::utility::jaccard;

/// Closeness of two distances in [0, 1]; two zero-length trails are identical
fn distance_closeness(a: f64, b: f64) -> f64 {
    let max = a.max(b);
    if max == 0.0 {
        return 1.0;
    }
    1.0 - (a - b).abs() / max
}

/// Similarity of two trails in [0, 1] using `params.similarity` as the blend
pub fn trail_similarity_with(t1: &Trail, t2: &Trail, params: &ModelParams) -> f64 {
    let blend = &params.similarity;
    let scenery = jaccard(&t1.scenery_types, &t2.scenery_types);
    let difficulty = if t1.difficulty == t2.difficulty { 1.0 } else { 0.0 };
    let distance = distance_closeness(t1.distance_km, t2.distance_km);
    let location = if t1.location == t2.location { 1.0 } else { 0.0 };

    blend.scenery * scenery
        + blend.difficulty * difficulty
        + blend.distance * distance
        + blend.location * location
}

/// Similarity of two trails in [0, 1]
pub fn trail_similarity(t1: &Trail, t2: &Trail) -> f64 {
    trail_similarity_with(t1, t2, &ModelParams::default())
}

/// One minus the mean pairwise similarity; 1.0 for fewer than two trails
pub fn diversity_with<T: AsRef<Trail>>(trails: &[T], params: &ModelParams) -> f64 {
    if trails.len() <= 1 {
        return 1.0;
    }

    let mut total = 0.0;
    let mut comparisons = 0usize;
    for i in 0..trails.len() {
        for j in (i + 1)..trails.len() {
            total += trail_similarity_with(trails[i].as_ref(), trails[j].as_ref(), params);
            comparisons += 1;
        }
    }

    1.0 - total / comparisons as f64
}

/// One minus the mean pairwise similarity; 1.0 for fewer than two trails
pub fn diversity<T: AsRef<Trail>>(trails: &[T]) -> f64 {
    diversity_with(trails, &ModelParams::default())
}
