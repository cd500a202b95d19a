//! Rings partition each cluster's points by their distance-to-centre, scaled by that cluster's
//! average cost, into geometrically growing bands plus a shortfall and an overshoot bucket.
//!
use log::debug;

use crate::assignment::ClusterAssignment;
use crate::errors::CoresetError;

/// Partitions every point of a clustering into rings `(cluster, l)`, a per-cluster shortfall
/// bucket (points too close to their centre for any ring) and a per-cluster overshoot bucket
/// (points too far from their centre for any ring).
///
/// Ring range indices run from `range_lo` to `range_hi` inclusive, with
/// `range_lo = -floor(log10(beta))` and `range_hi = -range_lo`.
pub struct RingSet {
    range_lo: i32,
    range_hi: i32,
    num_clusters: usize,
    rings: Vec<Vec<Vec<usize>>>,
    shortfall: Vec<Vec<usize>>,
    overshoot: Vec<Vec<usize>>,
}

impl RingSet {
    /// Builds the ring/shortfall/overshoot partition for `assignments`, with ring scale `beta`.
    pub fn build(assignments: &ClusterAssignment, beta: f64) -> Result<RingSet, CoresetError> {
        if beta <= 1.0 {
            return Err(CoresetError::InvalidConfig {
                reason: format!("beta={beta} must be > 1"),
            });
        }

        let range_lo = -(beta.log10().floor() as i32);
        let range_hi = -range_lo;
        let num_ranges = (range_hi - range_lo + 1) as usize;
        let k = assignments.num_clusters();
        let n = assignments.num_points();

        let mut rings = vec![vec![Vec::new(); num_ranges]; k];
        let mut shortfall = vec![Vec::new(); k];
        let mut overshoot = vec![Vec::new(); k];
        let average_costs = assignments.average_costs();

        for p in 0..n {
            let c = assignments.get_cluster(p);
            let dist = assignments.get_distance(p);
            let avg = average_costs[c];

            if avg <= 0.0 {
                // A cluster whose points all coincide with its centre has no meaningful ring
                // scale; such points are, by definition, as close to the centre as possible.
                shortfall[c].push(p);
                continue;
            }

            let mut placed = false;
            for l in range_lo..=range_hi {
                let lower = avg * (l as f64).exp2();
                let upper = avg * ((l + 1) as f64).exp2();
                if dist >= lower && dist < upper {
                    rings[c][(l - range_lo) as usize].push(p);
                    placed = true;
                    break;
                }
            }

            if !placed {
                let inner_most = avg * (range_lo as f64).exp2();
                let outer_most = avg * ((range_hi + 1) as f64).exp2();
                if dist < inner_most {
                    shortfall[c].push(p);
                } else if dist >= outer_most {
                    overshoot[c].push(p);
                } else {
                    return Err(CoresetError::InvariantViolation {
                        reason: format!(
                            "point {p} (cluster {c}, cost {dist}) belongs to neither a ring nor shortfall nor overshoot"
                        ),
                    });
                }
            }
        }

        let ring_points: usize = rings.iter().flatten().map(|v| v.len()).sum();
        let shortfall_points: usize = shortfall.iter().map(|v| v.len()).sum();
        let overshoot_points: usize = overshoot.iter().map(|v| v.len()).sum();
        debug!(
            "rings: {} in rings, {} shortfall, {} overshoot (n={})",
            ring_points, shortfall_points, overshoot_points, n
        );
        if ring_points + shortfall_points + overshoot_points != n {
            return Err(CoresetError::InvariantViolation {
                reason: "ring partition does not account for every point exactly once".to_string(),
            });
        }

        Ok(RingSet {
            range_lo,
            range_hi,
            num_clusters: k,
            rings,
            shortfall,
            overshoot,
        })
    }

    /// Inclusive lower bound of the ring range index.
    pub fn range_lo(&self) -> i32 {
        self.range_lo
    }

    /// Inclusive upper bound of the ring range index.
    pub fn range_hi(&self) -> i32 {
        self.range_hi
    }

    fn range_offset(&self, l: i32) -> usize {
        debug_assert!((self.range_lo..=self.range_hi).contains(&l));
        (l - self.range_lo) as usize
    }

    /// Points in ring `(cluster, l)`.
    pub fn ring_points(&self, cluster: usize, l: i32) -> &[usize] {
        &self.rings[cluster][self.range_offset(l)]
    }

    /// Sum of per-point cost over ring `(cluster, l)`.
    pub fn ring_cost(&self, assignments: &ClusterAssignment, cluster: usize, l: i32) -> f64 {
        self.ring_points(cluster, l).iter().map(|&p| assignments.get_distance(p)).sum()
    }

    /// Sum of `ring_cost(c, l)` over every cluster `c`, for a fixed range index `l`.
    pub fn total_ring_cost_for_range(&self, assignments: &ClusterAssignment, l: i32) -> f64 {
        (0..self.num_clusters).map(|c| self.ring_cost(assignments, c, l)).sum()
    }

    /// Points in the shortfall bucket of `cluster`.
    pub fn shortfall_points(&self, cluster: usize) -> &[usize] {
        &self.shortfall[cluster]
    }

    /// Points in the overshoot bucket of `cluster`.
    pub fn overshoot_points(&self, cluster: usize) -> &[usize] {
        &self.overshoot[cluster]
    }

    /// All overshoot points, across every cluster.
    pub fn all_overshoot_points(&self) -> Vec<usize> {
        self.overshoot.iter().flatten().copied().collect()
    }

    /// Sum of per-point cost over the overshoot bucket of `cluster`.
    pub fn overshoot_cost(&self, assignments: &ClusterAssignment, cluster: usize) -> f64 {
        self.overshoot[cluster].iter().map(|&p| assignments.get_distance(p)).sum()
    }

    /// Sum of per-point cost over every cluster's overshoot bucket.
    pub fn total_overshoot_cost(&self, assignments: &ClusterAssignment) -> f64 {
        (0..self.num_clusters).map(|c| self.overshoot_cost(assignments, c)).sum()
    }
}
