//! Coreset build configuration: the user-facing knobs for one `build_coreset` call, plus the
//! validation rules that reject a nonsensical combination up front.
//!
use crate::errors::CoresetError;
use crate::random::UNSEEDED;

/// Configuration for one `build_coreset` call.
///
/// Defaults: `k_prime` to `2*k`, `beta` to `200`, `j` to `4`, `max_iters` to `100`,
/// `convergence_eps` to `1e-4` and `seed` to [`UNSEEDED`] (OS entropy).
#[derive(Debug, Clone)]
pub struct CoresetConfig {
    /// Target number of clusters for downstream use.
    pub k: usize,
    /// Number of centres in the bicriteria clustering. `None` resolves to `2 * k`.
    pub k_prime: Option<usize>,
    /// Target total coreset size before shortfall/centre additions.
    pub t: usize,
    /// Ring scale controlling `L_lo = -floor(log10(beta))`.
    pub beta: f64,
    /// Number of groups per ring range.
    pub j: usize,
    /// Upper bound on Lloyd iterations.
    pub max_iters: usize,
    /// Frobenius-norm threshold for Lloyd termination.
    pub convergence_eps: f64,
    /// Fixed PRNG seed, or [`UNSEEDED`] for OS-entropy seeding.
    pub seed: u64,
}

impl CoresetConfig {
    /// A configuration with every option at its default, given only `k` and `t`.
    pub fn new(k: usize, t: usize) -> CoresetConfig {
        CoresetConfig {
            k,
            k_prime: None,
            t,
            beta: 200.0,
            j: 4,
            max_iters: 100,
            convergence_eps: 1e-4,
            seed: UNSEEDED,
        }
    }

    /// `k_prime` if set explicitly, otherwise `2 * k`.
    pub fn resolved_k_prime(&self) -> usize {
        self.k_prime.unwrap_or(2 * self.k)
    }

    /// Validates this configuration against `n`, the number of points to be processed.
    pub fn validate(&self, n: usize) -> Result<(), CoresetError> {
        if self.k == 0 || self.k > n {
            return Err(CoresetError::InvalidConfig {
                reason: format!("k={} must be in [1, {n}]", self.k),
            });
        }
        let k_prime = self.resolved_k_prime();
        if k_prime == 0 || k_prime > n {
            return Err(CoresetError::InvalidConfig {
                reason: format!("k'={k_prime} must be in [1, {n}]"),
            });
        }
        if self.t == 0 {
            return Err(CoresetError::InvalidConfig {
                reason: "T must be > 0".to_string(),
            });
        }
        if self.beta <= 1.0 {
            return Err(CoresetError::InvalidConfig {
                reason: format!("beta={} must be > 1", self.beta),
            });
        }
        if self.j == 0 {
            return Err(CoresetError::InvalidConfig {
                reason: "J must be > 0".to_string(),
            });
        }
        if n == 0 {
            return Err(CoresetError::DegenerateData {
                reason: "no points to cluster".to_string(),
            });
        }
        Ok(())
    }
}
