use rayon::prelude::*;

/// Determines if objective vector `a` dominates `b` (larger is better):
/// at least as good everywhere and strictly better somewhere.
/// Equal vectors do not dominate each other.
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    debug_assert_eq!(a.len(), b.len());
    let mut strict = false;
    for (x, y) in a.iter().zip(b) {
        if x < y {
            return false;
        }
        if x > y {
            strict = true;
        }
    }
    strict
}

/// Checks if the vector at `index` is dominated by any other vector
pub fn is_dominated<V: AsRef<[f64]>>(index: usize, vectors: &[V]) -> bool {
    let target = vectors[index].as_ref();
    vectors
        .iter()
        .enumerate()
        .any(|(i, other)| i != index && dominates(other.as_ref(), target))
}

/// Indices of the non-dominated vectors, in input order
pub fn skyline_indices<V>(vectors: &[V]) -> Vec<usize>
where
    V: AsRef<[f64]> + Sync,
{
    (0..vectors.len())
        .into_par_iter()
        .filter(|&i| !is_dominated(i, vectors))
        .collect()
}
