//! Integration tests for the processor module
//!
//! Tests the complete ingestion pipeline using raw drop directories laid
//! out like the order bucket.

pub mod basic_processing;

use std::fs;
use std::path::{Path, PathBuf};

pub const HEADER: &str =
    "order_id,client_id,product_id,country,order_date,quantity,unit_price,status";

/// Write `<root>/<day>/<channel>_orders.csv` with a header and the given lines
pub fn write_order_file(root: &Path, day: &str, channel: &str, lines: &[&str]) -> PathBuf {
    let dir = root.join(day);
    fs::create_dir_all(&dir).unwrap();

    let mut contents = String::from(HEADER);
    contents.push_str("\r\n");
    for line in lines {
        contents.push_str(line);
        contents.push_str("\r\n");
    }

    let path = dir.join(format!("{}_orders.csv", channel));
    fs::write(&path, contents).unwrap();
    path
}
