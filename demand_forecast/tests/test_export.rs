mod common;

use common::{date, sarima_fixture};
use demand_forecast::engine::generate_forecast;
use demand_forecast::data::{SalesDataset, SalesRecord};
use demand_forecast::export::{
    export_file_name, write_csv_file, write_segments_csv, EXPORT_COLUMNS, SEGMENT_COLUMNS,
};
use demand_forecast::models::{ForecastModel, Horizon, ModelKind};
use demand_forecast::scenario::apply_holiday_uplift;
use demand_forecast::segmentation::cluster_stores;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_export_reads_back() {
    let model: ForecastModel = sarima_fixture().into();
    let base = generate_forecast(
        ModelKind::Sarima,
        &model,
        date(2015, 7, 31),
        Horizon::new(7).unwrap(),
    )
    .unwrap();
    let table = apply_holiday_uplift(&base, 15.0).unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join(export_file_name(1));
    write_csv_file(&table, &path).unwrap();

    let mut reader = csv::Reader::from_path(&path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, EXPORT_COLUMNS);

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 7);
    assert_eq!(&records[0][0], "2015-08-01");
    assert_eq!(&records[6][0], "2015-08-07");

    for (record, row) in records.iter().zip(table.rows()) {
        let predicted: f64 = record[1].parse().unwrap();
        let lower: f64 = record[2].parse().unwrap();
        let upper: f64 = record[3].parse().unwrap();
        assert_eq!(predicted, row.predicted);
        assert_eq!(lower, row.lower_bound);
        assert_eq!(upper, row.upper_bound);
    }
}

#[test]
fn test_export_into_missing_directory_fails() {
    let model: ForecastModel = sarima_fixture().into();
    let table = generate_forecast(
        ModelKind::Sarima,
        &model,
        date(2015, 7, 31),
        Horizon::new(1).unwrap(),
    )
    .unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing").join("out.csv");
    assert!(write_csv_file(&table, &path).is_err());
    assert!(!path.exists());
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}

#[test]
fn test_segments_csv_one_row_per_store() {
    let records = (1..=3u32)
        .flat_map(|store| {
            date(2015, 7, 1)
                .iter_days()
                .take(4)
                .enumerate()
                .map(move |(i, day)| SalesRecord {
                    store_id: store,
                    date: day,
                    sales: 1000.0 * store as f64 + i as f64 * 10.0,
                    promo: i == 0,
                })
        })
        .collect();
    let dataset = SalesDataset::new(records).unwrap();
    let segmentation = cluster_stores(&dataset, 2).unwrap();

    let mut buffer = Vec::new();
    write_segments_csv(&segmentation, &mut buffer).unwrap();

    let mut reader = csv::Reader::from_reader(buffer.as_slice());
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, SEGMENT_COLUMNS);

    let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 3);
    for (record, store) in records.iter().zip(segmentation.stores()) {
        assert_eq!(record[0].parse::<u32>().unwrap(), store.features.store_id);
        assert_eq!(record[1].parse::<f64>().unwrap(), store.features.avg_sales);
        assert_eq!(record[3].parse::<f64>().unwrap(), 0.25);
        assert_eq!(record[4].parse::<usize>().unwrap(), store.cluster);
    }
}
