mod common;

use common::{date, write_csv};
use demand_forecast::data::{DataLoader, SalesDataset, SalesRecord};
use demand_forecast::ForecastError;
use polars::prelude::*;

#[test]
fn test_data_loader_from_csv() {
    let file = write_csv(&[
        "Store,Date,Sales,Promo",
        "1,2015-07-31,5263,1",
        "2,2015-07-31,6064,1",
        "1,2015-07-29,4822,0",
        "1,2015-07-30,5651,1",
    ]);

    let dataset = DataLoader::from_csv(file.path()).unwrap();
    assert_eq!(dataset.len(), 4);
    assert!(!dataset.is_empty());
    assert_eq!(dataset.store_ids(), vec![1, 2]);

    let first = dataset.records()[0];
    assert_eq!(first.store_id, 1);
    assert_eq!(first.date, date(2015, 7, 31));
    assert_eq!(first.sales, 5263.0);
    assert!(first.promo);
}

#[test]
fn test_store_history_is_sorted() {
    let file = write_csv(&[
        "Store,Date,Sales,Promo",
        "1,2015-07-31,5263,1",
        "2,2015-07-31,6064,1",
        "1,2015-07-29,4822,0",
        "1,2015-07-30,5651,1",
    ]);
    let dataset = DataLoader::from_csv(file.path()).unwrap();

    let history = dataset.store_history(1).unwrap();
    assert_eq!(history.store_id(), 1);
    assert_eq!(
        history.dates(),
        &[date(2015, 7, 29), date(2015, 7, 30), date(2015, 7, 31)]
    );
    assert_eq!(history.sales(), &[4822.0, 5651.0, 5263.0]);
    assert_eq!(history.last_date(), date(2015, 7, 31));

    assert!(matches!(
        dataset.store_history(3),
        Err(ForecastError::DataLoad(msg)) if msg.contains("store_id=3")
    ));
}

#[test]
fn test_data_loader_from_dataframe_with_date_dtype() {
    // 16647 days after the epoch is 2015-07-31
    let df = DataFrame::new(vec![
        Series::new("Store", &[1i64, 1]),
        Series::new("Date", &[16646i32, 16647])
            .cast(&DataType::Date)
            .unwrap(),
        Series::new("Sales", &[100.5f64, 200.0]),
        Series::new("Promo", &[0i64, 1]),
    ])
    .unwrap();

    let dataset = DataLoader::from_dataframe(df).unwrap();
    let history = dataset.store_history(1).unwrap();
    assert_eq!(history.last_date(), date(2015, 7, 31));
    assert_eq!(history.sales(), &[100.5, 200.0]);
}

#[test]
fn test_data_loader_error_handling() {
    // Non-existent file
    assert!(matches!(
        DataLoader::from_csv("nonexistent_file.csv"),
        Err(ForecastError::DataLoad(_))
    ));

    // Missing Promo column
    let file = write_csv(&["Store,Date,Sales", "1,2015-07-31,5263"]);
    assert!(matches!(
        DataLoader::from_csv(file.path()),
        Err(ForecastError::DataLoad(msg)) if msg.contains("Promo")
    ));

    // Unparseable date
    let file = write_csv(&["Store,Date,Sales,Promo", "1,31/07/2015,5263,1"]);
    assert!(DataLoader::from_csv(file.path()).is_err());

    // Promo outside 0/1
    let file = write_csv(&["Store,Date,Sales,Promo", "1,2015-07-31,5263,2"]);
    assert!(matches!(
        DataLoader::from_csv(file.path()),
        Err(ForecastError::DataLoad(msg)) if msg.contains("Promo=2")
    ));

    // Negative sales
    let file = write_csv(&["Store,Date,Sales,Promo", "1,2015-07-31,-5,1"]);
    assert!(matches!(
        DataLoader::from_csv(file.path()),
        Err(ForecastError::DataLoad(_))
    ));
}

#[test]
fn test_duplicate_store_date_rejected() {
    let record = SalesRecord {
        store_id: 4,
        date: date(2015, 7, 31),
        sales: 10.0,
        promo: false,
    };
    let result = SalesDataset::new(vec![record, record]);
    assert!(matches!(
        result,
        Err(ForecastError::DataLoad(msg)) if msg.contains("duplicate")
    ));
}
