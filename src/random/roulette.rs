//! Weighted categorical draws where the weights are the outcome probabilities
//! themselves and need not sum to one. Whatever mass is left over selects
//! "no outcome".

use crate::error::ModelError;

// Absorbs rounding in sums such as 0.7 + 0.3.
const SUM_TOLERANCE: f64 = 1e-12;

/// Checks that `weights` can be used with `roulette`: every weight finite and
/// non-negative and the total at most 1.
///
/// # Errors
///
/// Returns `ModelError::SamplingError` describing the first problem found.
pub fn validate_roulette_weights(weights: &[f64]) -> Result<(), ModelError> {
    if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(ModelError::SamplingError(format!(
            "roulette weight {bad} is not a finite, non-negative probability"
        )));
    }
    let total: f64 = weights.iter().sum();
    if total > 1.0 + SUM_TOLERANCE {
        return Err(ModelError::SamplingError(format!(
            "roulette weights {weights:?} sum to {total}, which exceeds 1"
        )));
    }
    Ok(())
}

/// Maps a uniform draw `u` in `[0, 1)` to an outcome index.
///
/// Outcome `k` owns the interval `[w_0 + .. + w_{k-1}, w_0 + .. + w_k)`, so it is
/// selected with probability exactly `w_k`. Draws past the last interval return
/// `Ok(None)`.
///
/// # Errors
///
/// Returns `ModelError::SamplingError` if the weights fail
/// `validate_roulette_weights`.
pub fn roulette(weights: &[f64], u: f64) -> Result<Option<usize>, ModelError> {
    validate_roulette_weights(weights)?;
    let mut upper = 0.0;
    for (index, weight) in weights.iter().enumerate() {
        upper += weight;
        if u < upper {
            return Ok(Some(index));
        }
    }
    Ok(None)
}
