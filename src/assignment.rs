//! Cluster assignment table: for each point, which cluster it belongs to and how far it is
//! from that cluster's centre.
//!
use log::debug;
use nalgebra::DMatrix;

/// For every point of a dataset, records the index of its closest centre and the Euclidean
/// distance to it. Derived statistics (cluster sizes, per-cluster average cost, total cost)
/// are computed on demand rather than cached.
#[derive(Debug, Clone)]
pub struct ClusterAssignment {
    num_points: usize,
    num_clusters: usize,
    cluster: Vec<usize>,
    distance: Vec<f64>,
}

impl ClusterAssignment {
    /// Creates an assignment table for `num_points` points and `num_clusters` clusters, with
    /// every point tentatively assigned to cluster 0 at distance 0.
    pub fn new(num_points: usize, num_clusters: usize) -> ClusterAssignment {
        ClusterAssignment {
            num_points,
            num_clusters,
            cluster: vec![0; num_points],
            distance: vec![0.0; num_points],
        }
    }

    /// Records that `point_index` belongs to `cluster_index`, at the given distance from its
    /// centre.
    pub fn assign(&mut self, point_index: usize, cluster_index: usize, distance: f64) {
        debug_assert!(point_index < self.num_points);
        debug_assert!(cluster_index < self.num_clusters);
        self.cluster[point_index] = cluster_index;
        self.distance[point_index] = distance;
    }

    /// Assigns every row of `points` to its nearest row of `centers` under Euclidean distance.
    /// Ties are broken by the smallest cluster index.
    pub fn assign_all(&mut self, points: &DMatrix<f64>, centers: &DMatrix<f64>) {
        let n = points.nrows();
        let k = centers.nrows();
        debug_assert_eq!(n, self.num_points);
        debug_assert_eq!(k, self.num_clusters);

        for p in 0..n {
            let mut best_distance = f64::MAX;
            let mut best_cluster = 0;
            let point = points.row(p);
            for c in 0..k {
                let distance = (point - centers.row(c)).norm();
                if distance < best_distance {
                    best_distance = distance;
                    best_cluster = c;
                }
            }
            self.assign(p, best_cluster, best_distance);
        }
        debug!(
            "assignAll: {} points assigned to {} clusters, total cost {:.5}",
            n,
            k,
            self.total_cost()
        );
    }

    /// The cluster index assigned to `point_index`.
    pub fn get_cluster(&self, point_index: usize) -> usize {
        self.cluster[point_index]
    }

    /// The distance of `point_index` to its assigned cluster's centre.
    pub fn get_distance(&self, point_index: usize) -> f64 {
        self.distance[point_index]
    }

    /// All per-point distances, in point order.
    pub fn distances(&self) -> &[f64] {
        &self.distance
    }

    /// Number of points in the dataset.
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Number of clusters.
    pub fn num_clusters(&self) -> usize {
        self.num_clusters
    }

    /// Number of points currently assigned to `cluster_index`.
    pub fn size(&self, cluster_index: usize) -> usize {
        self.cluster.iter().filter(|&&c| c == cluster_index).count()
    }

    /// Sum of the distance of every point to its assigned centre.
    pub fn total_cost(&self) -> f64 {
        self.distance.iter().sum()
    }

    /// Average distance-to-centre of points assigned to `cluster_index`, i.e. `Δ_c`.
    ///
    /// Empty clusters report an average cost of `0.0` (the denominator is clamped to 1).
    pub fn average_cost(&self, cluster_index: usize) -> f64 {
        let mut sum = 0.0;
        let mut count = 0usize;
        for p in 0..self.num_points {
            if self.cluster[p] == cluster_index {
                sum += self.distance[p];
                count += 1;
            }
        }
        sum / (count.max(1) as f64)
    }

    /// `average_cost(c)` for every cluster `c`, in cluster order.
    pub fn average_costs(&self) -> Vec<f64> {
        (0..self.num_clusters).map(|c| self.average_cost(c)).collect()
    }
}
