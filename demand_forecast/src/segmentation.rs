//! Store segmentation by aggregate sales behavior
//!
//! Each store is described by its mean daily sales, the sample standard
//! deviation of those sales and the share of days with a promotion. The three
//! features are standardized across stores and grouped with k-means seeded
//! with [`DEFAULT_SEED`], so the same dataset and `k` always give the same
//! assignment. Labels are arbitrary identifiers with no ranking.

use crate::data::SalesDataset;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use store_math::{kmeans, mean, sample_std_dev, standardize_columns, KMeansConfig};
use tracing::info;

/// Seed used for the segmentation k-means unless one is given
pub const DEFAULT_SEED: u64 = 42;

/// Default number of segments
pub const DEFAULT_CLUSTERS: usize = 3;

/// Aggregate features of one store
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StoreFeatures {
    pub store_id: u32,
    /// Mean daily sales
    pub avg_sales: f64,
    /// Sample standard deviation of daily sales; 0 for a single observation
    pub sales_std: f64,
    /// Fraction of days with a promotion
    pub promo_ratio: f64,
}

/// Store features together with the assigned segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusteredStore {
    pub features: StoreFeatures,
    pub cluster: usize,
}

/// Result of segmenting every store in a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSegmentation {
    stores: Vec<ClusteredStore>,
    k: usize,
    inertia: f64,
}

impl StoreSegmentation {
    /// Stores ordered by id, each with its features and label
    pub fn stores(&self) -> &[ClusteredStore] {
        &self.stores
    }

    /// Number of clusters
    pub fn k(&self) -> usize {
        self.k
    }

    /// Within-cluster sum of squares in standardized feature space
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Label of `store_id`, if the store was segmented
    pub fn cluster_of(&self, store_id: u32) -> Option<usize> {
        self.stores
            .iter()
            .find(|s| s.features.store_id == store_id)
            .map(|s| s.cluster)
    }

    /// Store id to label mapping
    pub fn assignments(&self) -> BTreeMap<u32, usize> {
        self.stores
            .iter()
            .map(|s| (s.features.store_id, s.cluster))
            .collect()
    }

    /// Store ids carrying `label`
    pub fn members(&self, label: usize) -> Vec<u32> {
        self.stores
            .iter()
            .filter(|s| s.cluster == label)
            .map(|s| s.features.store_id)
            .collect()
    }
}

/// Aggregate features per store, ordered by store id
pub fn store_features(dataset: &SalesDataset) -> Result<Vec<StoreFeatures>> {
    let mut grouped: BTreeMap<u32, (Vec<f64>, Vec<f64>)> = BTreeMap::new();
    for record in dataset.records() {
        let entry = grouped.entry(record.store_id).or_default();
        entry.0.push(record.sales);
        entry.1.push(if record.promo { 1.0 } else { 0.0 });
    }

    grouped
        .into_iter()
        .map(|(store_id, (sales, promo))| {
            Ok(StoreFeatures {
                store_id,
                avg_sales: mean(&sales)?,
                sales_std: sample_std_dev(&sales).unwrap_or(0.0),
                promo_ratio: mean(&promo)?,
            })
        })
        .collect()
}

/// Segment stores into `k` groups with the default seed
pub fn cluster_stores(dataset: &SalesDataset, k: usize) -> Result<StoreSegmentation> {
    cluster_stores_with_seed(dataset, k, DEFAULT_SEED)
}

/// Segment stores into `k` groups with an explicit seed
pub fn cluster_stores_with_seed(
    dataset: &SalesDataset,
    k: usize,
    seed: u64,
) -> Result<StoreSegmentation> {
    if k == 0 {
        return Err(ForecastError::InvalidParameter(
            "k=0: at least one cluster is required".to_string(),
        ));
    }

    let features = store_features(dataset)?;
    if features.len() < k {
        return Err(ForecastError::InsufficientData {
            stores: features.len(),
            k,
        });
    }

    let matrix: Vec<Vec<f64>> = features
        .iter()
        .map(|f| vec![f.avg_sales, f.sales_std, f.promo_ratio])
        .collect();
    let scaled = standardize_columns(&matrix)?;

    let result = kmeans(&scaled, &KMeansConfig::default().k(k).seed(seed))?;

    info!(
        stores = features.len(),
        k,
        seed,
        inertia = result.inertia,
        iterations = result.n_iter,
        "Store segmentation finished"
    );

    let stores = features
        .into_iter()
        .zip(result.labels)
        .map(|(features, cluster)| ClusteredStore { features, cluster })
        .collect();

    Ok(StoreSegmentation {
        stores,
        k,
        inertia: result.inertia,
    })
}
