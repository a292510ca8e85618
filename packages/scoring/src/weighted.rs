//! Zero-aware weighted mean.
//!
//! Zero is treated as "no data" on the value side and "no influence" on
//! the weight side: any pair with either component equal to zero is
//! excluded before the weights are renormalized. This is a deliberate,
//! long-standing property of the score — a tract with a missing (zero
//! filled) indicator is scored on its remaining indicators instead of
//! being dragged toward zero.

/// Computes the weighted arithmetic mean of the surviving (value, weight)
/// pairs, with the surviving weights renormalized to sum to 1.
///
/// Pairs where either the value or the weight is zero are dropped. If no
/// pairs survive, the result is 0. Inputs of unequal length are combined
/// pairwise up to the shorter length.
#[must_use]
pub fn weighted_mean(values: &[f64], weights: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = values
        .iter()
        .zip(weights.iter())
        .filter(|(v, w)| **v != 0.0 && **w != 0.0)
        .map(|(v, w)| (*v, *w))
        .collect();

    let weight_sum: f64 = pairs.iter().map(|(_, w)| w).sum();
    if pairs.is_empty() || weight_sum == 0.0 {
        return 0.0;
    }

    pairs.iter().map(|(v, w)| v * (w / weight_sum)).sum()
}
