use std::env;

use clap::Parser;
use log::info;
use rand::prelude::*;
use rand_distr::Normal;

use coresets::{build_coreset, io::read_matrix_tsv, CoresetConfig};
use nalgebra::DMatrix;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
/// Build a k-means coreset from a dense point matrix
/// say build_coreset -h to see options
struct Args {
    /// tab-separated file of N-dimensional input points; if omitted, a synthetic 3-blob dataset is generated
    #[clap(short, long, short = 'i')]
    infile: Option<String>,
    /// target number of clusters for downstream use
    #[clap(short, long, default_value = "3", short = 'k')]
    k: usize,
    /// target coreset size before shortfall/centre additions
    #[clap(short, long, default_value = "20", short = 't')]
    t: usize,
    /// fixed PRNG seed for reproducible output
    #[clap(short, long, default_value = "42", short = 's')]
    seed: u64,
}

/// Draws 100 points from three well-separated 2-D Gaussian blobs, for local experimentation
/// when no `--infile` is given.
fn synthetic_blobs(seed: u64) -> DMatrix<f64> {
    let centers = [(-10.0, -10.0), (0.0, 0.0), (5.0, 5.0)];
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 0.5).unwrap();

    let mut data = DMatrix::<f64>::zeros(centers.len() * 34, 2);
    let mut row = 0;
    for &(cx, cy) in &centers {
        for _ in 0..34 {
            data[(row, 0)] = cx + normal.sample(&mut rng);
            data[(row, 1)] = cy + normal.sample(&mut rng);
            row += 1;
        }
    }
    data
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    env_logger::init();

    let args = Args::parse();

    let points = match &args.infile {
        Some(fname) => read_matrix_tsv(fname).expect("could not read the input matrix"),
        None => synthetic_blobs(args.seed),
    };
    info!("loaded {} points in {} dimensions", points.nrows(), points.ncols());

    let mut config = CoresetConfig::new(args.k, args.t);
    config.seed = args.seed;

    let (centers, coreset) = build_coreset(&points, &config).expect("coreset construction failed");
    info!(
        "built a coreset of {} weighted points (total weight {:.2}) against {} centres",
        coreset.size(),
        coreset.total_weight(),
        centers.nrows()
    );

    for wp in coreset.points() {
        if wp.is_center {
            println!("center\t{}\t{:.6}", wp.index, wp.weight);
        } else {
            println!("point\t{}\t{:.6}", wp.index, wp.weight);
        }
    }
}
