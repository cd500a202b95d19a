//! Coreset construction for k-means clustering via group sampling, with a sensitivity-sampling
//! fallback.
//!
//! Given a dense N×D point matrix, [`build_coreset`] runs a k-means++ seeded bicriteria
//! clustering, partitions points into cost rings and groups, and returns a small weighted
//! coreset whose k-means cost approximates the full dataset's cost under any candidate centre
//! configuration. [`sensitivity::SensitivitySampler`] is also exposed standalone, for callers
//! who already have a clustering and just want a sensitivity-sampling coreset from it.
pub mod assignment;
pub mod config;
pub mod coreset;
pub mod errors;
pub mod group_sampling;
pub mod groups;
pub mod io;
pub mod kmeans;
pub mod random;
pub mod rings;
pub mod sensitivity;

pub use assignment::ClusterAssignment;
pub use config::CoresetConfig;
pub use coreset::{Coreset, WeightedPoint};
pub use errors::CoresetError;
pub use group_sampling::GroupSampler;
pub use groups::{Group, GroupSet};
pub use kmeans::{ClusteringResult, KMeans};
pub use random::Random;
pub use rings::RingSet;
pub use sensitivity::SensitivitySampler;

use nalgebra::DMatrix;

/// Builds a group-sampling coreset for `points` under `config`.
///
/// This is the crate's main entry point, wiring up the full pipeline: the k-means engine
/// produces a bicriteria clustering and its assignment table, which the group sampler
/// partitions into rings and groups, invoking the sensitivity sampler as a fallback for
/// overshoot points.
///
/// Returns the centre matrix that the coreset's `is_center=true` entries resolve against,
/// alongside the coreset itself; see [`coreset::Coreset`] for how to interpret its entries.
pub fn build_coreset(points: &DMatrix<f64>, config: &CoresetConfig) -> Result<(DMatrix<f64>, Coreset), CoresetError> {
    GroupSampler::sample(points, config)
}
