use chrono::{Days, NaiveDate};
use demand_forecast::data::{SalesDataset, SalesRecord};
use demand_forecast::segmentation::{cluster_stores, cluster_stores_with_seed, store_features};
use demand_forecast::ForecastError;
use std::collections::BTreeSet;

fn store_records(store_id: u32, base: f64, promo_every: usize) -> Vec<SalesRecord> {
    let start = NaiveDate::from_ymd_opt(2015, 7, 1).unwrap();
    (0..10)
        .map(|i| SalesRecord {
            store_id,
            date: start.checked_add_days(Days::new(i as u64)).unwrap(),
            sales: base + (i % 3) as f64 * base * 0.02 + store_id as f64,
            promo: promo_every != 0 && i % promo_every == 0,
        })
        .collect()
}

/// Small quiet stores, mid-size stores, large promo-heavy stores
fn three_tier_dataset() -> SalesDataset {
    let mut records = Vec::new();
    for store in 1..=3 {
        records.extend(store_records(store, 1_000.0, 0));
    }
    for store in 4..=6 {
        records.extend(store_records(store, 5_000.0, 2));
    }
    for store in 7..=9 {
        records.extend(store_records(store, 12_000.0, 1));
    }
    SalesDataset::new(records).unwrap()
}

#[test]
fn test_fewer_stores_than_clusters() {
    let mut records = store_records(1, 100.0, 2);
    records.extend(store_records(2, 200.0, 2));
    let dataset = SalesDataset::new(records).unwrap();

    let err = cluster_stores(&dataset, 3).unwrap_err();
    assert!(matches!(err, ForecastError::InsufficientData { stores: 2, k: 3 }));
}

#[test]
fn test_every_store_gets_one_label() {
    let segmentation = cluster_stores(&three_tier_dataset(), 3).unwrap();
    let assignments = segmentation.assignments();

    assert_eq!(assignments.len(), 9);
    assert!(assignments.keys().copied().eq(1..=9));
    assert!(assignments.values().all(|&label| label < 3));
}

#[test]
fn test_tiers_are_separated() {
    let segmentation = cluster_stores(&three_tier_dataset(), 3).unwrap();

    let label_of = |store| segmentation.cluster_of(store).unwrap();
    let tiers = [[1, 2, 3], [4, 5, 6], [7, 8, 9]];
    for tier in &tiers {
        assert!(tier.iter().all(|&s| label_of(s) == label_of(tier[0])));
    }

    let distinct: BTreeSet<usize> = tiers.iter().map(|t| label_of(t[0])).collect();
    assert_eq!(distinct.len(), 3);

    for label in 0..3 {
        assert_eq!(segmentation.members(label).len(), 3);
    }
}

#[test]
fn test_same_seed_same_labels() {
    let dataset = three_tier_dataset();
    let first = cluster_stores_with_seed(&dataset, 2, 7).unwrap();
    let second = cluster_stores_with_seed(&dataset, 2, 7).unwrap();

    assert_eq!(first.assignments(), second.assignments());
    assert_eq!(first.inertia(), second.inertia());
}

#[test]
fn test_features_follow_store_order() {
    let features = store_features(&three_tier_dataset()).unwrap();
    let ids: Vec<u32> = features.iter().map(|f| f.store_id).collect();
    assert_eq!(ids, (1..=9).collect::<Vec<_>>());

    assert_eq!(features[0].promo_ratio, 0.0);
    assert_eq!(features[8].promo_ratio, 1.0);
    assert!(features[8].avg_sales > features[4].avg_sales);
}

#[test]
fn test_single_cluster() {
    let segmentation = cluster_stores(&three_tier_dataset(), 1).unwrap();
    assert_eq!(segmentation.members(0).len(), 9);
}
