//! Groups bucket ring points of a fixed ring range `l` by how much their host cluster
//! contributes to that range's total cost, so sampling effort can be spent where the cost is.
//!
use std::collections::HashMap;

use log::debug;

use crate::assignment::ClusterAssignment;
use crate::errors::CoresetError;
use crate::rings::RingSet;

/// A set of points drawn from rings of a single range `l`, whose host clusters all contribute
/// a similar, `j`-indexed share of that range's total cost.
#[derive(Debug, Clone)]
pub struct Group {
    j: usize,
    range: i32,
    points: Vec<usize>,
}

impl Group {
    /// The `j` index of the cost band this group occupies.
    pub fn j(&self) -> usize {
        self.j
    }

    /// The ring range `l` this group was carved out of.
    pub fn range(&self) -> i32 {
        self.range
    }

    /// Points belonging to this group.
    pub fn points(&self) -> &[usize] {
        &self.points
    }

    /// Sum of per-point cost over this group's points.
    pub fn cost(&self, assignments: &ClusterAssignment) -> f64 {
        self.points.iter().map(|&p| assignments.get_distance(p)).sum()
    }
}

/// The full collection of groups produced for one ring range decomposition.
pub struct GroupSet {
    groups: Vec<Group>,
}

impl GroupSet {
    /// Builds groups for every ring range `l` of `rings`, banding each cluster's ring cost into
    /// `num_groups` dyadic shares of that range's total cost, scaled by `1/k_prime`.
    ///
    /// A cluster's ring cost that is too small to fall into any of the `num_groups` explicit
    /// bands (an underflow only possible for highly skewed cost distributions) is placed in the
    /// smallest-cost band, `j = num_groups - 1`, so every non-empty ring still lands in exactly
    /// one group; see DESIGN.md.
    pub fn build_ring_groups(
        assignments: &ClusterAssignment,
        rings: &RingSet,
        k_prime: usize,
        num_groups: usize,
    ) -> Result<GroupSet, CoresetError> {
        if num_groups == 0 {
            return Err(CoresetError::InvalidConfig {
                reason: "num_groups (J) must be > 0".to_string(),
            });
        }

        let mut buckets: HashMap<(usize, i32), Vec<usize>> = HashMap::new();
        let k_prime = k_prime as f64;

        for l in rings.range_lo()..=rings.range_hi() {
            let range_total_cost = rings.total_ring_cost_for_range(assignments, l);
            if range_total_cost <= 0.0 {
                continue;
            }

            let mut points_seen_for_l = 0usize;
            let mut points_grouped_for_l = 0usize;

            for c in 0..assignments.num_clusters() {
                let ring_points = rings.ring_points(c, l);
                if ring_points.is_empty() {
                    continue;
                }
                points_seen_for_l += ring_points.len();

                let cluster_cost = rings.ring_cost(assignments, c, l);
                let mut chosen_j = None;
                for j in 0..num_groups {
                    let lower = (1.0 / k_prime) * (-(j as f64)).exp2() * range_total_cost;
                    let in_band = if j == 0 {
                        cluster_cost >= lower
                    } else {
                        let upper = (1.0 / k_prime) * (-(j as f64) + 1.0).exp2() * range_total_cost;
                        cluster_cost >= lower && cluster_cost < upper
                    };
                    if in_band {
                        chosen_j = Some(j);
                        break;
                    }
                }
                let j = chosen_j.unwrap_or(num_groups - 1);

                buckets.entry((j, l)).or_default().extend_from_slice(ring_points);
                points_grouped_for_l += ring_points.len();
            }

            if points_seen_for_l != points_grouped_for_l {
                return Err(CoresetError::InvariantViolation {
                    reason: format!("ring range l={l}: {points_seen_for_l} ring points but only {points_grouped_for_l} were grouped"),
                });
            }
        }

        let groups: Vec<Group> = buckets
            .into_iter()
            .map(|((j, range), points)| Group { j, range, points })
            .collect();
        debug!("built {} groups across {} ring ranges", groups.len(), rings.range_hi() - rings.range_lo() + 1);

        Ok(GroupSet { groups })
    }

    /// All groups produced by [`build_ring_groups`](GroupSet::build_ring_groups).
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Total number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether no groups were produced (e.g. every ring was empty).
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
