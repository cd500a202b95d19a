//! Deterministic random source shared by every sampling step of the coreset pipeline.
//!
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::errors::CoresetError;

/// Sentinel seed value requesting OS-entropy seeding instead of a fixed, reproducible seed.
pub const UNSEEDED: u64 = u64::MAX;

/// Wraps a single [`SmallRng`] instance and exposes the sampling primitives the coreset
/// pipeline needs: uniform indices, uniform reals, weighted choice (with replacement) and
/// weighted reservoir sampling (Chao's A-Res).
///
/// A `Random` is meant to be owned exclusively by one `build` call: every operation mutates
/// its internal RNG state, so sharing one instance across concurrent builds would make results
/// depend on call interleaving.
pub struct Random {
    rng: SmallRng,
}

impl Random {
    /// Creates a new random source. Pass [`UNSEEDED`] to seed from OS entropy; any other value
    /// is used as a fixed seed, making every subsequent draw deterministic.
    pub fn new(seed: u64) -> Random {
        let rng = if seed == UNSEEDED {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(seed)
        };
        Random { rng }
    }

    /// Returns a uniformly distributed index in `[0, n)`.
    ///
    /// # Panics
    /// Panics if `n == 0`.
    pub fn uniform_index(&mut self, n: usize) -> usize {
        assert!(n > 0, "uniform_index() requires a non-empty range");
        self.rng.gen_range(0..n)
    }

    /// Returns a uniformly distributed real number in `[0.0, 1.0)`.
    pub fn uniform_real(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }

    /// Draws a single index with probability proportional to `weights[i]`.
    ///
    /// `weights` must be non-negative and sum to a finite, strictly positive value.
    pub fn weighted_choice(&mut self, weights: &[f64]) -> Result<usize, CoresetError> {
        let total: f64 = weights.iter().sum();
        if !total.is_finite() || total <= 0.0 {
            return Err(CoresetError::Numerical {
                reason: format!("weighted_choice(): weights sum to {total}, expected a finite positive value"),
            });
        }

        let target = self.uniform_real() * total;
        let mut cumulative = 0.0;
        for (i, &w) in weights.iter().enumerate() {
            cumulative += w;
            if cumulative > target {
                return Ok(i);
            }
        }
        // Floating point rounding may leave `target` a hair above the final cumulative sum;
        // the last non-zero-weight index is the correct answer in that case.
        weights
            .iter()
            .rposition(|&w| w > 0.0)
            .ok_or_else(|| CoresetError::Numerical {
                reason: "weighted_choice(): no candidate with positive weight".to_string(),
            })
    }

    /// Draws `k` indices with replacement, each according to [`weighted_choice`](Random::weighted_choice).
    pub fn weighted_choice_many(&mut self, k: usize, weights: &[f64]) -> Result<Vec<usize>, CoresetError> {
        (0..k).map(|_| self.weighted_choice(weights)).collect()
    }

    /// Weighted reservoir sampling of `k` distinct positions out of `weights.len()`, using
    /// Chao's A-Res algorithm.
    ///
    /// The first `k` positions seed the reservoir; every later position `i` replaces a
    /// uniformly-chosen reservoir slot with probability `k * weights[i] / sum(weights[0..=i])`.
    pub fn weighted_reservoir(&mut self, k: usize, weights: &[f64]) -> Result<Vec<usize>, CoresetError> {
        let n = weights.len();
        if k == 0 || k > n {
            return Err(CoresetError::InvalidConfig {
                reason: format!("weighted_reservoir(): k={k} must be in [1, {n}]"),
            });
        }

        let mut reservoir: Vec<usize> = (0..k).collect();
        let mut sum: f64 = weights[0..k].iter().sum();

        for (i, &w) in weights.iter().enumerate().skip(k) {
            sum += w;
            let p_i = (k as f64) * w / sum;
            let q = self.uniform_real();
            if q <= p_i {
                let slot = self.uniform_index(k);
                reservoir[slot] = i;
            }
        }

        Ok(reservoir)
    }
}
