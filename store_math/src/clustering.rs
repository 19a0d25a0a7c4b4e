//! K-means clustering for feature vectors
//!
//! Lloyd's algorithm with k-means++ seeding. All randomness comes from a
//! `StdRng` seeded from the configuration, so identical input and seed always
//! produce identical assignments.

use crate::{MathError, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// K-means configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansConfig {
    /// Number of clusters
    pub k: usize,
    /// Maximum Lloyd iterations per run
    pub max_iter: usize,
    /// Number of independently seeded runs; the lowest inertia wins
    pub n_init: usize,
    /// Convergence tolerance, relative to the mean feature variance
    pub tolerance: f64,
    /// Seed for centroid initialisation
    pub seed: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            k: 3,
            max_iter: 300,
            n_init: 10,
            tolerance: 1e-4,
            seed: 42,
        }
    }
}

impl KMeansConfig {
    /// Set number of clusters
    pub fn k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Set maximum iterations
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set number of restarts
    pub fn n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init.max(1);
        self
    }

    /// Set random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// K-means clustering result
#[derive(Debug, Clone, PartialEq)]
pub struct KMeansResult {
    /// Cluster label for each input point, in `[0, k)`
    pub labels: Vec<usize>,
    /// Cluster centroids
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances to the assigned centroid
    pub inertia: f64,
    /// Iterations performed by the winning run
    pub n_iter: usize,
}

impl KMeansResult {
    /// Indices of the points assigned to `cluster`
    pub fn cluster_members(&self, cluster: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == cluster)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of points in each cluster
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centroids.len()];
        for &label in &self.labels {
            sizes[label] += 1;
        }
        sizes
    }
}

/// Partition `points` into `config.k` clusters.
///
/// # Errors
///
/// * `InvalidInput` when `k` is zero or the points have differing dimensions
/// * `InsufficientData` when there are fewer points than clusters
pub fn kmeans(points: &[Vec<f64>], config: &KMeansConfig) -> Result<KMeansResult> {
    if config.k == 0 {
        return Err(MathError::InvalidInput(
            "Number of clusters must be greater than zero".to_string(),
        ));
    }
    if points.len() < config.k {
        return Err(MathError::InsufficientData(format!(
            "Need at least {} points for {} clusters, have {}",
            config.k,
            config.k,
            points.len()
        )));
    }

    let dim = points[0].len();
    if points.iter().any(|p| p.len() != dim) {
        return Err(MathError::InvalidInput(
            "All points must have the same number of features".to_string(),
        ));
    }
    if points.iter().flatten().any(|v| !v.is_finite()) {
        return Err(MathError::InvalidInput(
            "Points must not contain NaN or infinite values".to_string(),
        ));
    }

    let tolerance = config.tolerance * mean_feature_variance(points, dim);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut best: Option<KMeansResult> = None;

    for _ in 0..config.n_init.max(1) {
        let initial = initialize_centroids(points, config.k, &mut rng);
        let run = lloyd(points, initial, config.max_iter, tolerance);

        if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
            best = Some(run);
        }
    }

    best.ok_or_else(|| MathError::CalculationError("K-means produced no run".to_string()))
}

/// Pick initial centroids with k-means++ (D² weighting).
fn initialize_centroids(points: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..n)].clone());

    while centroids.len() < k {
        let distances: Vec<f64> = points
            .iter()
            .map(|p| {
                centroids
                    .iter()
                    .map(|c| squared_distance(p, c))
                    .fold(f64::INFINITY, f64::min)
            })
            .collect();
        let total: f64 = distances.iter().sum();

        // Every point already coincides with a centroid
        if total <= 0.0 {
            centroids.push(points[rng.gen_range(0..n)].clone());
            continue;
        }

        let threshold = rng.gen::<f64>() * total;
        let mut cumsum = 0.0;
        let mut selected = n - 1;
        for (i, &d) in distances.iter().enumerate() {
            cumsum += d;
            if cumsum > threshold {
                selected = i;
                break;
            }
        }

        centroids.push(points[selected].clone());
    }

    centroids
}

fn lloyd(
    points: &[Vec<f64>],
    mut centroids: Vec<Vec<f64>>,
    max_iter: usize,
    tolerance: f64,
) -> KMeansResult {
    let k = centroids.len();
    let mut labels = assign(points, &centroids);
    let mut n_iter = 0;

    for iter in 0..max_iter {
        n_iter = iter + 1;

        let updated = update_centroids(points, &labels, &centroids, k);
        let shift: f64 = centroids
            .iter()
            .zip(updated.iter())
            .map(|(old, new)| squared_distance(old, new))
            .sum();

        centroids = updated;
        labels = assign(points, &centroids);

        if shift <= tolerance {
            break;
        }
    }

    let inertia = points
        .iter()
        .zip(labels.iter())
        .map(|(p, &l)| squared_distance(p, &centroids[l]))
        .sum();

    KMeansResult {
        labels,
        centroids,
        inertia,
        n_iter,
    }
}

/// Nearest centroid per point; ties go to the lower label.
fn assign(points: &[Vec<f64>], centroids: &[Vec<f64>]) -> Vec<usize> {
    points
        .iter()
        .map(|p| {
            let mut nearest = 0;
            let mut min_dist = f64::INFINITY;
            for (i, c) in centroids.iter().enumerate() {
                let dist = squared_distance(p, c);
                if dist < min_dist {
                    min_dist = dist;
                    nearest = i;
                }
            }
            nearest
        })
        .collect()
}

fn update_centroids(
    points: &[Vec<f64>],
    labels: &[usize],
    previous: &[Vec<f64>],
    k: usize,
) -> Vec<Vec<f64>> {
    let dim = points[0].len();
    let mut sums = vec![vec![0.0; dim]; k];
    let mut counts = vec![0usize; k];

    for (p, &l) in points.iter().zip(labels.iter()) {
        counts[l] += 1;
        for (s, v) in sums[l].iter_mut().zip(p.iter()) {
            *s += v;
        }
    }

    let mut centroids: Vec<Vec<f64>> = sums
        .into_iter()
        .zip(counts.iter())
        .map(|(sum, &count)| {
            if count == 0 {
                Vec::new()
            } else {
                sum.into_iter().map(|s| s / count as f64).collect()
            }
        })
        .collect();

    // An empty cluster takes over the point farthest from its own centroid
    let mut taken = vec![false; points.len()];
    for cluster in 0..k {
        if !centroids[cluster].is_empty() {
            continue;
        }
        let farthest = points
            .iter()
            .enumerate()
            .filter(|(i, _)| !taken[*i])
            .map(|(i, p)| (i, squared_distance(p, &previous[labels[i]])))
            .fold((0, f64::NEG_INFINITY), |best, cur| {
                if cur.1 > best.1 {
                    cur
                } else {
                    best
                }
            })
            .0;
        taken[farthest] = true;
        centroids[cluster] = points[farthest].clone();
    }

    centroids
}

fn mean_feature_variance(points: &[Vec<f64>], dim: usize) -> f64 {
    if dim == 0 {
        return 0.0;
    }
    let n = points.len() as f64;

    (0..dim)
        .map(|j| {
            let avg = points.iter().map(|p| p[j]).sum::<f64>() / n;
            points.iter().map(|p| (p[j] - avg).powi(2)).sum::<f64>() / n
        })
        .sum::<f64>()
        / dim as f64
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_blobs() -> Vec<Vec<f64>> {
        vec![
            vec![1.0, 1.0],
            vec![1.2, 0.8],
            vec![0.9, 1.1],
            vec![10.0, 10.0],
            vec![10.2, 9.8],
            vec![9.9, 10.1],
        ]
    }

    #[test]
    fn test_kmeans_separates_blobs() {
        let points = two_blobs();
        let result = kmeans(&points, &KMeansConfig::default().k(2)).unwrap();

        assert_eq!(result.labels.len(), 6);
        assert_eq!(result.labels[0], result.labels[1]);
        assert_eq!(result.labels[0], result.labels[2]);
        assert_eq!(result.labels[3], result.labels[4]);
        assert_eq!(result.labels[3], result.labels[5]);
        assert_ne!(result.labels[0], result.labels[3]);
        assert_eq!(result.cluster_sizes(), vec![3, 3]);
    }

    #[test]
    fn test_kmeans_is_reproducible() {
        let points = two_blobs();
        let config = KMeansConfig::default().k(3).seed(7);

        let first = kmeans(&points, &config).unwrap();
        let second = kmeans(&points, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_k_equal_to_points_has_zero_inertia() {
        let points = vec![vec![0.0], vec![5.0], vec![9.0]];
        let result = kmeans(&points, &KMeansConfig::default().k(3)).unwrap();

        assert_relative_eq!(result.inertia, 0.0);
        let mut labels = result.labels.clone();
        labels.sort_unstable();
        assert_eq!(labels, vec![0, 1, 2]);
    }

    #[test]
    fn test_identical_points_still_fill_every_cluster() {
        let points = vec![vec![1.0, 1.0]; 4];
        let result = kmeans(&points, &KMeansConfig::default().k(2)).unwrap();

        assert_eq!(result.labels.len(), 4);
        assert!(result.labels.iter().all(|&l| l < 2));
        assert_relative_eq!(result.inertia, 0.0);
    }

    #[test]
    fn test_kmeans_input_validation() {
        let points = two_blobs();

        assert!(matches!(
            kmeans(&points, &KMeansConfig::default().k(0)),
            Err(MathError::InvalidInput(_))
        ));
        assert!(matches!(
            kmeans(&points[..2], &KMeansConfig::default().k(3)),
            Err(MathError::InsufficientData(_))
        ));
        assert!(matches!(
            kmeans(&[vec![1.0], vec![1.0, 2.0]], &KMeansConfig::default().k(1)),
            Err(MathError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_cluster_members() {
        let result = KMeansResult {
            labels: vec![1, 0, 1],
            centroids: vec![vec![0.0], vec![1.0]],
            inertia: 0.0,
            n_iter: 1,
        };
        assert_eq!(result.cluster_members(1), vec![0, 2]);
        assert_eq!(result.cluster_members(0), vec![1]);
    }
}
