//! Sensitivity sampling: draws points with probability proportional to their k-means cost,
//! weighting each sample by the reciprocal of that probability (the Feldman-Langberg estimator
//! restricted to k-means cost).
//!
use log::debug;

use crate::coreset::Coreset;
use crate::errors::CoresetError;
use crate::kmeans::ClusteringResult;
use crate::random::Random;

/// Produces a weighted coreset of `t + k` points from a clustering: `t` points sampled with
/// replacement proportional to cost, plus one weighted centre per cluster.
pub struct SensitivitySampler;

impl SensitivitySampler {
    /// Draws a sensitivity-sampling coreset of `t` sampled points (plus one weight per centre)
    /// from `result`.
    pub fn sample(result: &ClusteringResult, t: usize, random: &mut Random) -> Result<Coreset, CoresetError> {
        if t == 0 {
            return Err(CoresetError::InvalidConfig {
                reason: "T must be > 0".to_string(),
            });
        }

        let assignments = result.assignments();
        let n = assignments.num_points();
        let k = assignments.num_clusters();
        let costs = assignments.distances();
        let total_cost: f64 = costs.iter().sum();

        if total_cost <= 0.0 {
            return Err(CoresetError::DegenerateData {
                reason: "every point coincides with its cluster centre; there is no cost to sample from".to_string(),
            });
        }

        let sampled = random.weighted_choice_many(t, costs)?;

        let mut coreset = Coreset::new();
        let mut center_weight_contribution = vec![0.0_f64; k];

        for &s in &sampled {
            let cost_s = costs[s];
            if cost_s <= 0.0 {
                return Err(CoresetError::Numerical {
                    reason: format!("sampled point {s} has zero cost; it should have had zero selection probability"),
                });
            }
            let weight = total_cost / (t as f64 * cost_s);
            coreset.add_point(s, weight);

            let c = assignments.get_cluster(s);
            center_weight_contribution[c] += weight;
        }

        for c in 0..k {
            let cluster_size = assignments.size(c) as f64;
            let center_weight = (cluster_size - center_weight_contribution[c]).max(0.0);
            coreset.add_center(c, center_weight);
        }

        debug!(
            "sensitivity sampling: n={} t={} k={} total_cost={:.5} coreset_size={}",
            n,
            t,
            k,
            total_cost,
            coreset.size()
        );

        Ok(coreset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmeans::KMeans;
    use nalgebra::DMatrix;

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
    fn coreset_size_is_t_plus_k() {
        let data = three_blobs();
        let clustering = KMeans::new(3, true, 100, 1e-4, 42).cluster(&data).unwrap();
        let mut random = Random::new(1);
        let coreset = SensitivitySampler::sample(&clustering, 9, &mut random).unwrap();
        assert_eq!(coreset.size(), 9 + 3);
    }

    #[test]
    fn rejects_zero_t() {
        let data = three_blobs();
        let clustering = KMeans::new(3, true, 100, 1e-4, 42).cluster(&data).unwrap();
        let mut random = Random::new(1);
        assert!(SensitivitySampler::sample(&clustering, 0, &mut random).is_err());
    }

    #[test]
    fn rejects_degenerate_all_zero_cost() {
        // every point is identical, so a single-cluster mean has zero cost everywhere
        let data = DMatrix::from_row_slice(3, 1, &[7.0, 7.0, 7.0]);
        let clustering = KMeans::new(1, true, 100, 1e-4, 1).cluster(&data).unwrap();
        let mut random = Random::new(1);
        assert!(SensitivitySampler::sample(&clustering, 5, &mut random).is_err());
    }

    #[test]
    fn determinism_under_fixed_seed() {
        let data = three_blobs();
        let clustering = KMeans::new(3, true, 100, 1e-4, 42).cluster(&data).unwrap();
        let mut r1 = Random::new(99);
        let mut r2 = Random::new(99);
        let c1 = SensitivitySampler::sample(&clustering, 12, &mut r1).unwrap();
        let c2 = SensitivitySampler::sample(&clustering, 12, &mut r2).unwrap();
        for (a, b) in c1.points().iter().zip(c2.points().iter()) {
            assert_eq!(a.index, b.index);
            assert_eq!(a.is_center, b.is_center);
            assert!((a.weight - b.weight).abs() < 1e-12);
        }
    }
}
