//! Weighted k-means partition producer.
//!
//! # Algorithm
//!
//! 1. Label-encode the configured features and scale them by weight
//! 2. For each of `n_init` restarts:
//!    a. Seed centroids with k-means++
//!    b. Alternate centroid update and nearest-centroid assignment until
//!       assignments stop changing or `max_iterations` is reached
//! 3. Keep the restart with the lowest inertia (ties: lowest restart index)
//!
//! # Reference
//!
//! Arthur, D. & Vassilvitskii, S. (2007). "k-means++: The Advantages of
//! Careful Seeding", *SODA '07*, 1027-1035.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::config::ClusterConfig;
use super::encode::encode;
use super::types::ClusterAssigner;
use crate::allocation::Record;
use crate::error::{Error, Result};

/// Result of a single k-means restart.
#[derive(Debug, Clone)]
struct KMeansRun {
    labels: Vec<usize>,
    inertia: f64,
    iterations: usize,
}

/// [`ClusterAssigner`] backed by weighted, label-encoded k-means.
///
/// # Examples
///
/// ```
/// use u_roomalloc::allocation::{Rank, Record};
/// use u_roomalloc::clustering::{ClusterAssigner, ClusterConfig, FeatureWeight, KMeansClusterer};
///
/// let records: Vec<Record> = ["Early", "Early", "Late", "Late"]
///     .iter()
///     .map(|s| Record::new(Rank::Unranked).with_attribute("sleep", *s))
///     .collect();
///
/// let config = ClusterConfig::default()
///     .with_k(2)
///     .with_features(vec![FeatureWeight::new("sleep", 1.0)]);
/// let labels = KMeansClusterer::new(config).unwrap().assign(&records).unwrap();
/// assert_eq!(labels[0], labels[1]);
/// assert_ne!(labels[1], labels[2]);
/// ```
#[derive(Debug, Clone)]
pub struct KMeansClusterer {
    config: ClusterConfig,
}

impl KMeansClusterer {
    pub fn new(config: ClusterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }
}

impl ClusterAssigner for KMeansClusterer {
    fn assign(&self, records: &[Record]) -> Result<Vec<usize>> {
        let config = &self.config;
        if records.is_empty() {
            return Ok(Vec::new());
        }
        if records.len() < config.k {
            return Err(Error::Clustering(format!(
                "{} records cannot form {} clusters",
                records.len(),
                config.k
            )));
        }

        let points = encode(records, &config.features, &config.missing_value);
        let base_seed = config.seed.unwrap_or_else(rand::random);
        let restart = |i: usize| {
            let mut rng = StdRng::seed_from_u64(base_seed.wrapping_add(i as u64));
            lloyd(&points, config.k, config.max_iterations, &mut rng)
        };

        let mut runs: Vec<KMeansRun> = if config.parallel {
            (0..config.n_init).into_par_iter().map(restart).collect()
        } else {
            (0..config.n_init).map(restart).collect()
        };

        let mut best = 0;
        for (i, run) in runs.iter().enumerate() {
            if run.inertia < runs[best].inertia {
                best = i;
            }
        }
        let winner = runs.swap_remove(best);
        log::info!(
            "k-means: k={} restart {} won with inertia {:.3} after {} iterations",
            config.k,
            best,
            winner.inertia,
            winner.iterations
        );
        Ok(winner.labels)
    }
}

fn sq_dist(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index of the closest centroid; ties go to the lowest index.
fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (c, centroid) in centroids.iter().enumerate() {
        let d = sq_dist(point, centroid);
        if d < best_d {
            best = c;
            best_d = d;
        }
    }
    best
}

fn assign_all(points: &[Vec<f64>], centroids: &[Vec<f64>]) -> Vec<usize> {
    points.iter().map(|p| nearest(p, centroids)).collect()
}

/// k-means++ seeding. When every point coincides with a chosen centroid,
/// further centroids are drawn uniformly.
fn seed_centroids<R: Rng>(points: &[Vec<f64>], k: usize, rng: &mut R) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.random_range(0..n)].clone());
    let mut dist: Vec<f64> = points.iter().map(|p| sq_dist(p, &centroids[0])).collect();

    while centroids.len() < k {
        let total: f64 = dist.iter().sum();
        let pick = if total > 0.0 {
            let target = rng.random::<f64>() * total;
            let mut acc = 0.0;
            let mut chosen = None;
            for (i, &d) in dist.iter().enumerate() {
                acc += d;
                if d > 0.0 && acc >= target {
                    chosen = Some(i);
                    break;
                }
            }
            // Rounding can leave `acc` just short of `target`.
            chosen.unwrap_or_else(|| dist.iter().rposition(|&d| d > 0.0).unwrap_or(0))
        } else {
            rng.random_range(0..n)
        };
        let centroid = points[pick].clone();
        for (d, p) in dist.iter_mut().zip(points) {
            *d = d.min(sq_dist(p, &centroid));
        }
        centroids.push(centroid);
    }
    centroids
}

/// Recomputes each centroid as the mean of its members. Empty clusters
/// keep their previous centroid.
fn update_centroids(points: &[Vec<f64>], labels: &[usize], centroids: &mut [Vec<f64>]) {
    let dim = points.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0; dim]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];
    for (p, &l) in points.iter().zip(labels) {
        counts[l] += 1;
        for (s, x) in sums[l].iter_mut().zip(p) {
            *s += x;
        }
    }
    for ((centroid, sum), count) in centroids.iter_mut().zip(sums).zip(counts) {
        if count > 0 {
            *centroid = sum.into_iter().map(|s| s / count as f64).collect();
        }
    }
}

fn lloyd<R: Rng>(points: &[Vec<f64>], k: usize, max_iterations: usize, rng: &mut R) -> KMeansRun {
    let mut centroids = seed_centroids(points, k, rng);
    let mut labels = assign_all(points, &centroids);
    let mut iterations = 0;

    while iterations < max_iterations {
        iterations += 1;
        update_centroids(points, &labels, &mut centroids);
        let next = assign_all(points, &centroids);
        if next == labels {
            break;
        }
        labels = next;
    }

    let inertia: f64 = points
        .iter()
        .zip(&labels)
        .map(|(p, &l)| sq_dist(p, &centroids[l]))
        .sum();
    KMeansRun {
        labels,
        inertia,
        iterations,
    }
}
