//! k-means++ seeded Lloyd iteration producing the bicriteria clustering the coreset samplers
//! need.
//!
use log::debug;
use nalgebra::DMatrix;

use crate::assignment::ClusterAssignment;
use crate::errors::CoresetError;
use crate::random::Random;

/// The outcome of a k-means run: the final centres and an assignment table consistent with
/// them (see [`KMeans::cluster`]).
#[derive(Debug, Clone)]
pub struct ClusteringResult {
    centers: DMatrix<f64>,
    assignments: ClusterAssignment,
}

impl ClusteringResult {
    /// The `k × d` matrix of final cluster centres.
    pub fn centers(&self) -> &DMatrix<f64> {
        &self.centers
    }

    /// The assignment table, consistent with [`centers`](ClusteringResult::centers).
    pub fn assignments(&self) -> &ClusterAssignment {
        &self.assignments
    }
}

/// Provides the k-means clustering algorithm: k-means++ (or uniform) initialisation followed
/// by Lloyd's iteration, mirroring `bioshell_clustering::kmeans::KMeans` generalised from a
/// single generic distance function to the dense `nalgebra` point matrix this crate works on.
pub struct KMeans {
    num_clusters: usize,
    use_plus_plus_init: bool,
    max_iterations: usize,
    convergence_eps: f64,
    seed: u64,
}

impl KMeans {
    /// Creates a new k-means engine.
    ///
    /// * `num_clusters` - number of clusters/centres to produce.
    /// * `use_plus_plus_init` - use k-means++ seeding rather than uniform random centres.
    /// * `max_iterations` - upper bound on Lloyd iterations.
    /// * `convergence_eps` - stop once the Frobenius norm of the centre delta drops below this.
    /// * `seed` - fixed PRNG seed, or [`crate::random::UNSEEDED`] for OS-entropy seeding.
    pub fn new(num_clusters: usize, use_plus_plus_init: bool, max_iterations: usize, convergence_eps: f64, seed: u64) -> KMeans {
        KMeans {
            num_clusters,
            use_plus_plus_init,
            max_iterations,
            convergence_eps,
            seed,
        }
    }

    /// Clusters `points` (an `n × d` matrix) into `self.num_clusters` clusters.
    pub fn cluster(&self, points: &DMatrix<f64>) -> Result<ClusteringResult, CoresetError> {
        let n = points.nrows();
        if n == 0 {
            return Err(CoresetError::DegenerateData {
                reason: "k-means input matrix has zero rows".to_string(),
            });
        }
        if self.num_clusters == 0 || self.num_clusters > n {
            return Err(CoresetError::InvalidConfig {
                reason: format!("k={} must be in [1, {}]", self.num_clusters, n),
            });
        }

        let mut random = Random::new(self.seed);
        let initial_centers = if self.use_plus_plus_init {
            self.init_centers_plus_plus(points, &mut random)?
        } else {
            self.init_centers_naive(points, &mut random)
        };

        self.run_lloyd(points, initial_centers, &mut random)
    }

    /// Picks `k` row indices uniformly at random, with replacement, and copies those rows as
    /// the initial centres.
    fn init_centers_naive(&self, points: &DMatrix<f64>, random: &mut Random) -> DMatrix<f64> {
        let d = points.ncols();
        let mut centers = DMatrix::<f64>::zeros(self.num_clusters, d);
        for c in 0..self.num_clusters {
            let row = random.uniform_index(points.nrows());
            centers.set_row(c, &points.row(row));
        }
        centers
    }

    /// k-means++ initialisation: the first centre is picked uniformly at random, each
    /// subsequent centre is drawn with probability proportional to its squared distance to the
    /// nearest centre picked so far.
    fn init_centers_plus_plus(&self, points: &DMatrix<f64>, random: &mut Random) -> Result<DMatrix<f64>, CoresetError> {
        let n = points.nrows();
        let d = points.ncols();
        let k = self.num_clusters;
        let mut centers = DMatrix::<f64>::zeros(k, d);

        let first = random.uniform_index(n);
        centers.set_row(0, &points.row(first));

        let mut squared_distances = vec![0.0_f64; n];
        for c in 1..k {
            let mut sum_d2 = 0.0;
            for p in 0..n {
                let mut min_d2 = f64::MAX;
                for c2 in 0..c {
                    let d2 = (points.row(p) - centers.row(c2)).norm_squared();
                    if d2 < min_d2 {
                        min_d2 = d2;
                    }
                }
                squared_distances[p] = min_d2;
                sum_d2 += min_d2;
            }

            if sum_d2 <= 0.0 {
                return Err(CoresetError::DegenerateData {
                    reason: "k-means++ init: every remaining point coincides with a chosen centre".to_string(),
                });
            }
            for v in squared_distances.iter_mut() {
                *v /= sum_d2;
            }

            let next = random.weighted_choice(&squared_distances)?;
            centers.set_row(c, &points.row(next));
        }

        Ok(centers)
    }

    /// Runs Lloyd's iteration to convergence (or `max_iterations`), starting from
    /// `initial_centers`.
    fn run_lloyd(&self, points: &DMatrix<f64>, mut centers: DMatrix<f64>, random: &mut Random) -> Result<ClusteringResult, CoresetError> {
        let n = points.nrows();
        let d = points.ncols();
        let k = self.num_clusters;
        let mut assignments = ClusterAssignment::new(n, k);

        for iteration in 0..self.max_iterations {
            assignments.assign_all(points, &centers);

            let previous_centers = centers.clone();
            let mut next_centers = DMatrix::<f64>::zeros(k, d);
            let mut counts = vec![0usize; k];
            for p in 0..n {
                let c = assignments.get_cluster(p);
                let mut row = next_centers.row_mut(c);
                row += points.row(p);
                counts[c] += 1;
            }
            for c in 0..k {
                if counts[c] == 0 {
                    // An empty cluster would otherwise collapse to the zero row; re-seed it
                    // from a random data point instead, since downstream code assumes every
                    // centre is a real candidate point.
                    let replacement = random.uniform_index(n);
                    next_centers.set_row(c, &points.row(replacement));
                } else {
                    let mut row = next_centers.row_mut(c);
                    row /= counts[c] as f64;
                }
            }
            centers = next_centers;

            let delta = (&centers - &previous_centers).norm();
            debug!(
                "k-means iteration {}: total cost {:.5}, Frobenius delta {:.6}",
                iteration,
                assignments.total_cost(),
                delta
            );

            if delta < self.convergence_eps {
                break;
            }
        }

        // Ensure the returned assignment table is consistent with the final centres, even if
        // the loop terminated by convergence one update step ahead of the last assignment.
        assignments.assign_all(points, &centers);

        Ok(ClusteringResult { centers, assignments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_blobs() -> DMatrix<f64> {
        let blob_a = [(-10.0, -10.0), (-9.5, -10.2), (-10.2, -9.6), (-9.8, -9.9)];
        let blob_b = [(0.0, 0.0), (0.3, -0.1), (-0.2, 0.2), (0.1, 0.1)];
        let blob_c = [(5.0, 5.0), (5.2, 4.8), (4.9, 5.1), (5.1, 5.3)];
        let rows: Vec<(f64, f64)> = blob_a.into_iter().chain(blob_b).chain(blob_c).collect();
        let mut m = DMatrix::<f64>::zeros(rows.len(), 2);
        for (i, (x, y)) in rows.into_iter().enumerate() {
            m[(i, 0)] = x;
            m[(i, 1)] = y;
        }
        m
    }

    #[test]
    fn clusters_well_separated_blobs() {
        let data = three_blobs();
        let kmeans = KMeans::new(3, true, 100, 1e-4, 42);
        let result = kmeans.cluster(&data).unwrap();
        // every point in the same blob must share a cluster label
        let a = result.assignments().get_cluster(0);
        for i in 1..4 {
            assert_eq!(result.assignments().get_cluster(i), a);
        }
        let b = result.assignments().get_cluster(4);
        for i in 5..8 {
            assert_eq!(result.assignments().get_cluster(i), b);
        }
        let c = result.assignments().get_cluster(8);
        for i in 9..12 {
            assert_eq!(result.assignments().get_cluster(i), c);
        }
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn assignment_matches_final_centers() {
        let data = three_blobs();
        let kmeans = KMeans::new(3, true, 100, 1e-4, 7);
        let result = kmeans.cluster(&data).unwrap();
        for p in 0..data.nrows() {
            let assigned = result.assignments().get_cluster(p);
            let mut best = f64::MAX;
            let mut best_c = 0;
            for c in 0..3 {
                let dist = (data.row(p) - result.centers().row(c)).norm();
                if dist < best {
                    best = dist;
                    best_c = c;
                }
            }
            assert_eq!(assigned, best_c);
            assert!((result.assignments().get_distance(p) - best).abs() < 1e-9);
        }
    }

    #[test]
    fn single_cluster_centre_is_the_mean() {
        let data = DMatrix::from_row_slice(4, 1, &[1.0, 2.0, 3.0, 4.0]);
        let kmeans = KMeans::new(1, false, 10, 1e-4, 1);
        let result = kmeans.cluster(&data).unwrap();
        assert!((result.centers()[(0, 0)] - 2.5).abs() < 1e-9);
    }

    #[test]
    fn rejects_k_larger_than_n() {
        let data = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        let kmeans = KMeans::new(5, true, 10, 1e-4, 1);
        assert!(kmeans.cluster(&data).is_err());
    }

    #[test]
    fn determinism_under_fixed_seed() {
        let data = three_blobs();
        let a = KMeans::new(3, true, 100, 1e-4, 42).cluster(&data).unwrap();
        let b = KMeans::new(3, true, 100, 1e-4, 42).cluster(&data).unwrap();
        assert_eq!(a.centers(), b.centers());
        for p in 0..data.nrows() {
            assert_eq!(a.assignments().get_cluster(p), b.assignments().get_cluster(p));
        }
    }
}
