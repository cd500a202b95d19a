//! Group sampling: the main coreset construction strategy. Bicriteria-clusters the dataset,
//! partitions points into rings and groups by cost, then combines centre weights for
//! shortfall points, cost-proportional sampling for ring points, and a sensitivity-sampling
//! fallback for overshoot points.
//!
use log::debug;
use nalgebra::DMatrix;

use crate::config::CoresetConfig;
use crate::coreset::Coreset;
use crate::errors::CoresetError;
use crate::groups::GroupSet;
use crate::kmeans::KMeans;
use crate::random::Random;
use crate::rings::RingSet;
use crate::sensitivity::SensitivitySampler;

/// Builds a group-sampling coreset for `points` under `config`.
///
/// Returns the centre matrix the coreset's `is_center=true` entries refer to, and the coreset
/// itself. When the overshoot fallback (step 7) runs, the returned centre matrix is the
/// bicriteria clustering's `k'` centres followed by the overshoot sub-clustering's own centres;
/// `is_center` indices into the overshoot portion are offset accordingly, so a single flat
/// centre matrix always resolves every coreset entry.
pub struct GroupSampler;

impl GroupSampler {
    pub fn sample(points: &DMatrix<f64>, config: &CoresetConfig) -> Result<(DMatrix<f64>, Coreset), CoresetError> {
        config.validate(points.nrows())?;
        let k_prime = config.resolved_k_prime();
        let d = points.ncols();

        // (1) Bicriteria clustering.
        let kmeans = KMeans::new(k_prime, true, config.max_iters, config.convergence_eps, config.seed);
        let clustering = kmeans.cluster(points)?;
        let assignments = clustering.assignments();

        // (2) Build rings.
        let rings = RingSet::build(assignments, config.beta)?;

        let mut coreset = Coreset::new();

        // (3) Shortfall contribution: snap near-centre points to their centre, for free.
        for c in 0..k_prime {
            let shortfall_size = rings.shortfall_points(c).len();
            if shortfall_size > 0 {
                coreset.add_center(c, shortfall_size as f64);
            }
        }

        // (5) Ring groups, (6) sample per group.
        let groups = GroupSet::build_ring_groups(assignments, &rings, k_prime, config.j)?;
        let assignment_total_cost = assignments.total_cost();
        let mut random = Random::new(config.seed);

        for group in groups.groups() {
            let group_points = group.points();
            if group_points.is_empty() {
                continue;
            }
            let group_cost = group.cost(assignments);
            let share = group_cost / assignment_total_cost;
            let num_samples = (config.t as f64 * share).ceil() as usize;
            if num_samples == 0 {
                continue;
            }

            let weights: Vec<f64> = group_points.iter().map(|&p| assignments.get_distance(p)).collect();
            let sampled_local = random.weighted_choice_many(num_samples, &weights)?;
            for local in sampled_local {
                let p = group_points[local];
                let cost_p = assignments.get_distance(p);
                if cost_p <= 0.0 {
                    return Err(CoresetError::Numerical {
                        reason: format!("group sample referenced point {p} with zero cost"),
                    });
                }
                let weight = assignment_total_cost / (config.t as f64 * cost_p);
                coreset.add_point(p, weight);
            }
        }

        debug!(
            "group sampling: {} groups processed, coreset size after ring sampling = {}",
            groups.len(),
            coreset.size()
        );

        // (7) Overshoot fallback: sensitivity-sample a secondary clustering of the overshoot
        // points, then append its weighted output with indices remapped back to the original
        // point matrix and centre indices offset past this clustering's k' centres.
        let mut centers = clustering.centers().clone();
        let overshoot_points = rings.all_overshoot_points();

        if !overshoot_points.is_empty() {
            let mut sub_matrix = DMatrix::<f64>::zeros(overshoot_points.len(), d);
            for (row, &p) in overshoot_points.iter().enumerate() {
                sub_matrix.set_row(row, &points.row(p));
            }

            let overshoot_cost = rings.total_overshoot_cost(assignments);
            let share = (overshoot_cost / assignment_total_cost).max(0.0);
            let t_sub = ((config.t as f64 * share).ceil() as usize).max(1);
            let k_sub = k_prime.min(overshoot_points.len());

            let sub_kmeans = KMeans::new(k_sub, true, config.max_iters, config.convergence_eps, config.seed);
            let sub_result = sub_kmeans.cluster(&sub_matrix)?;

            match SensitivitySampler::sample(&sub_result, t_sub, &mut random) {
                Ok(sub_coreset) => {
                    let offset = centers.nrows();
                    for wp in sub_coreset.points() {
                        if wp.is_center {
                            coreset.add_center(wp.index + offset, wp.weight);
                        } else {
                            coreset.add_point(overshoot_points[wp.index], wp.weight);
                        }
                    }

                    let sub_centers = sub_result.centers();
                    let mut combined = DMatrix::<f64>::zeros(offset + sub_centers.nrows(), d);
                    combined.rows_mut(0, offset).copy_from(&centers);
                    combined.rows_mut(offset, sub_centers.nrows()).copy_from(sub_centers);
                    centers = combined;
                }
                Err(CoresetError::DegenerateData { .. }) => {
                    // The overshoot sub-clustering has no cost to sample from (e.g. a single
                    // overshoot point, whose own mean has zero distance to it). Represent each
                    // overshoot point exactly, by weight 1, rather than failing the whole build.
                    debug!("overshoot fallback degenerate ({} points); representing them by weight 1 each", overshoot_points.len());
                    for &p in &overshoot_points {
                        coreset.add_point(p, 1.0);
                    }
                }
                Err(other) => return Err(other),
            }
        }

        Ok((centers, coreset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_blobs_plus_outlier() -> DMatrix<f64> {
        let blob_a = [(-10.0, -10.0), (-9.5, -10.2), (-10.2, -9.6), (-9.8, -9.9)];
        let blob_b = [(0.0, 0.0), (0.3, -0.1), (-0.2, 0.2), (0.1, 0.1)];
        let blob_c = [(5.0, 5.0), (5.2, 4.8), (4.9, 5.1), (5.1, 5.3)];
        let outliers = [(80.0, 80.0), (-80.0, 80.0)];
        let rows: Vec<(f64, f64)> = blob_a.into_iter().chain(blob_b).chain(blob_c).chain(outliers).collect();
        let mut m = DMatrix::<f64>::zeros(rows.len(), 2);
        for (i, (x, y)) in rows.into_iter().enumerate() {
            m[(i, 0)] = x;
            m[(i, 1)] = y;
        }
        m
    }

    #[test]
    fn produces_a_non_empty_coreset_with_consistent_centers() {
        let data = three_blobs_plus_outlier();
        let mut config = CoresetConfig::new(3, 10);
        config.seed = 42;
        let (centers, coreset) = GroupSampler::sample(&data, &config).unwrap();
        assert!(!coreset.is_empty());
        for wp in coreset.points() {
            if wp.is_center {
                assert!(wp.index < centers.nrows());
            } else {
                assert!(wp.index < data.nrows());
            }
            assert!(wp.weight.is_finite());
            assert!(wp.weight >= 0.0);
        }
    }

    #[test]
    fn empty_overshoot_dataset_has_no_overshoot_centers_beyond_k_prime() {
        // a tight dataset with no far-flung outliers: overshoot should stay empty, and the
        // centre matrix should have exactly k' rows (no secondary clustering appended)
        let blob_a = [(-1.0, -1.0), (-0.9, -1.1), (-1.1, -0.9), (-1.0, -0.8)];
        let blob_b = [(1.0, 1.0), (1.1, 0.9), (0.9, 1.1), (1.0, 1.2)];
        let rows: Vec<(f64, f64)> = blob_a.into_iter().chain(blob_b).collect();
        let mut data = DMatrix::<f64>::zeros(rows.len(), 2);
        for (i, (x, y)) in rows.into_iter().enumerate() {
            data[(i, 0)] = x;
            data[(i, 1)] = y;
        }
        let mut config = CoresetConfig::new(2, 8);
        config.beta = 1000.0;
        config.seed = 7;
        let (centers, _coreset) = GroupSampler::sample(&data, &config).unwrap();
        assert_eq!(centers.nrows(), config.resolved_k_prime());
    }

    #[test]
    fn determinism_under_fixed_seed() {
        let data = three_blobs_plus_outlier();
        let mut config = CoresetConfig::new(3, 10);
        config.seed = 123;
        let (centers_a, coreset_a) = GroupSampler::sample(&data, &config).unwrap();
        let (centers_b, coreset_b) = GroupSampler::sample(&data, &config).unwrap();
        assert_eq!(centers_a, centers_b);
        assert_eq!(coreset_a.size(), coreset_b.size());
        for (a, b) in coreset_a.points().iter().zip(coreset_b.points().iter()) {
            assert_eq!(a.index, b.index);
            assert_eq!(a.is_center, b.is_center);
            assert!((a.weight - b.weight).abs() < 1e-12);
        }
    }
}
