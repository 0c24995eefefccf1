//! Basic ingestion tests

use super::write_order_file;
use crate::config::{OrdersConfig, SinkFormat};
use crate::models::OrderRecord;
use crate::processor::{OrdersProcessor, default_output_path};
use polars::prelude::{ParquetReader, SerReader};
use std::fs::{self, File};
use tempfile::TempDir;

fn create_raw_drop(temp_dir: &TempDir) -> std::path::PathBuf {
    let root = temp_dir.path().join("globalshop-raw");
    write_order_file(
        &root,
        "2025-04-01",
        "MOB",
        &[
            "MOB-20250401-1,52011,812,Brazil,2025-04-01,4,321.4,PAID",
            "MOB-20250401-2,1877,9120,India,2025-04-01,1,12.05,CANCELLED",
        ],
    );
    write_order_file(
        &root,
        "2025-04-01",
        "PART",
        &[
            "PART-20250401-1,2044,1500,USA,2025-04-01,12,410.0,PAID",
            "PART-20250401-2,bad,1500,USA,2025-04-01,12,410.0,PAID",
        ],
    );
    write_order_file(
        &root,
        "2025-04-02",
        "MOB",
        &[
            "MOB-20250402-3,99,77,Canada,2025-04-02,2,55.5,PAID",
            "MOB-20250402-4,99,77,\"Toronto, ON\",2025-04-02,2,55.5,PAID",
        ],
    );
    root
}

#[tokio::test]
async fn test_process_raw_drop_to_parquet() {
    let temp_dir = TempDir::new().unwrap();
    let root = create_raw_drop(&temp_dir);
    let output = temp_dir.path().join("out").join("orders.parquet");

    let mut processor =
        OrdersProcessor::new(root, Some(output.clone()), OrdersConfig::default()).unwrap();
    let stats = processor.process().await.unwrap();

    assert_eq!(stats.files_processed, 3);
    assert_eq!(stats.files_failed, 0);
    assert_eq!(stats.lines_read, 9);
    assert_eq!(stats.records_emitted, 4);
    assert_eq!(stats.skips.header_rows, 3);
    assert_eq!(stats.skips.numeric_failures, 1);
    assert_eq!(stats.skips.arity_mismatches, 1);
    assert_eq!(stats.output_path, Some(output.clone()));

    let df = ParquetReader::new(File::open(&output).unwrap())
        .finish()
        .unwrap();
    assert_eq!(df.height(), 4);
    assert_eq!(df.width(), 8);
}

#[tokio::test]
async fn test_process_raw_drop_to_ndjson_keeps_file_order() {
    let temp_dir = TempDir::new().unwrap();
    let root = create_raw_drop(&temp_dir);
    let output = temp_dir.path().join("orders.ndjson");
    let config = OrdersConfig::default()
        .with_format(SinkFormat::Ndjson)
        .with_max_concurrent_files(3);

    let mut processor = OrdersProcessor::new(root, Some(output.clone()), config).unwrap();
    let stats = processor.process().await.unwrap();
    assert_eq!(stats.records_emitted, 4);

    let contents = fs::read_to_string(&output).unwrap();
    let ids: Vec<String> = contents
        .lines()
        .map(|line| serde_json::from_str::<OrderRecord>(line).unwrap().order_id)
        .collect();
    assert_eq!(
        ids,
        vec![
            "MOB-20250401-1",
            "MOB-20250401-2",
            "PART-20250401-1",
            "MOB-20250402-3"
        ]
    );
}

#[tokio::test]
async fn test_strict_mode_drops_unknown_status() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("raw");
    write_order_file(
        &root,
        "2025-04-03",
        "WEB",
        &[
            "WEB-20250403-1,40000,5000,Japan,2025-04-03,3,99.99,PAID",
            "WEB-20250403-2,40001,5001,Japan,2025-04-03,3,99.99,REFUNDED",
            "WEB-20250403-3,40002,5002,Japan,2025-04-31,3,99.99,PAID",
        ],
    );
    let config = OrdersConfig::default()
        .with_strict_validation()
        .with_format(SinkFormat::Ndjson);

    let mut processor = OrdersProcessor::new(root, None, config).unwrap();
    let stats = processor.process().await.unwrap();

    assert_eq!(stats.records_emitted, 1);
    assert_eq!(stats.skips.unknown_statuses, 1);
    assert_eq!(stats.skips.invalid_dates, 1);
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let root = create_raw_drop(&temp_dir);
    let output = temp_dir.path().join("orders.parquet");

    let mut processor =
        OrdersProcessor::new(root, Some(output.clone()), OrdersConfig::default().with_dry_run())
            .unwrap();
    let stats = processor.process().await.unwrap();

    assert_eq!(stats.records_emitted, 4);
    assert_eq!(stats.output_path, None);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_default_output_path_beside_input() {
    let temp_dir = TempDir::new().unwrap();
    let root = create_raw_drop(&temp_dir);

    let mut processor = OrdersProcessor::new(root.clone(), None, OrdersConfig::default()).unwrap();
    assert_eq!(processor.output_path(), root.join("orders.parquet"));

    processor.process().await.unwrap();
    assert!(root.join("orders.parquet").exists());
}

#[test]
fn test_default_output_path_for_single_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = write_order_file(temp_dir.path(), "2025-04-01", "WEB", &[]);

    assert_eq!(
        default_output_path(&file, SinkFormat::Ndjson),
        temp_dir.path().join("2025-04-01").join("orders.ndjson")
    );
}

#[tokio::test]
async fn test_empty_directory_produces_empty_output() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("orders.ndjson");
    let config = OrdersConfig::default().with_format(SinkFormat::Ndjson);

    let mut processor =
        OrdersProcessor::new(temp_dir.path().to_path_buf(), Some(output.clone()), config).unwrap();
    let stats = processor.process().await.unwrap();

    assert_eq!(stats.files_processed, 0);
    assert_eq!(stats.records_emitted, 0);
    assert_eq!(fs::read_to_string(&output).unwrap(), "");
}
