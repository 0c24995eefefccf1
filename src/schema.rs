//! Destination table schema and columnar conversion.
//!
//! The analytical store expects `order_date` as a DATE column, while the
//! line transform passes it through as text. Conversion to the columnar
//! layout is where the date is parsed; dates that do not parse become null.

use crate::constants::{FIELD_NAMES, ORDER_DATE_FORMAT};
use crate::error::Result;
use crate::models::OrderRecord;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use tracing::debug;

/// Days between 0001-01-01 (CE day 1) and 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Column types of the destination table, in column order
pub fn destination_schema() -> Schema {
    let [
        order_id,
        client_id,
        product_id,
        country,
        order_date,
        quantity,
        unit_price,
        status,
    ] = FIELD_NAMES;

    Schema::from_iter([
        (PlSmallStr::from_static(order_id), DataType::String),
        (PlSmallStr::from_static(client_id), DataType::Int64),
        (PlSmallStr::from_static(product_id), DataType::Int64),
        (PlSmallStr::from_static(country), DataType::String),
        (PlSmallStr::from_static(order_date), DataType::Date),
        (PlSmallStr::from_static(quantity), DataType::Int64),
        (PlSmallStr::from_static(unit_price), DataType::Float64),
        (PlSmallStr::from_static(status), DataType::String),
    ])
}

/// Days since the Unix epoch, as stored in a polars `Date` column
fn epoch_days(order_date: &str) -> Option<i32> {
    NaiveDate::parse_from_str(order_date, ORDER_DATE_FORMAT)
        .ok()
        .map(|date| date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
}

/// Build a DataFrame laid out like the destination table
pub fn records_to_dataframe(records: &[OrderRecord]) -> Result<DataFrame> {
    let order_dates: Vec<Option<i32>> = records.iter().map(|r| epoch_days(&r.order_date)).collect();
    let unparsed_dates = order_dates.iter().filter(|d| d.is_none()).count();
    if unparsed_dates > 0 {
        debug!(
            "{} order_date values are not YYYY-MM-DD and will be null",
            unparsed_dates
        );
    }

    let columns = vec![
        Column::from(Series::new(
            "order_id".into(),
            records.iter().map(|r| r.order_id.as_str()).collect::<Vec<_>>(),
        )),
        Column::from(Series::new(
            "client_id".into(),
            records.iter().map(|r| r.client_id).collect::<Vec<i64>>(),
        )),
        Column::from(Series::new(
            "product_id".into(),
            records.iter().map(|r| r.product_id).collect::<Vec<i64>>(),
        )),
        Column::from(Series::new(
            "country".into(),
            records.iter().map(|r| r.country.as_str()).collect::<Vec<_>>(),
        )),
        Column::from(Series::new("order_date".into(), order_dates).cast(&DataType::Date)?),
        Column::from(Series::new(
            "quantity".into(),
            records.iter().map(|r| r.quantity).collect::<Vec<i64>>(),
        )),
        Column::from(Series::new(
            "unit_price".into(),
            records.iter().map(|r| r.unit_price).collect::<Vec<f64>>(),
        )),
        Column::from(Series::new(
            "status".into(),
            records.iter().map(|r| r.status.as_str()).collect::<Vec<_>>(),
        )),
    ];

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(order_id: &str, order_date: &str) -> OrderRecord {
        OrderRecord {
            order_id: order_id.to_string(),
            client_id: 12,
            product_id: 1500,
            country: "UK".to_string(),
            order_date: order_date.to_string(),
            quantity: 6,
            unit_price: 250.75,
            status: "PAID".to_string(),
        }
    }

    #[test]
    fn test_destination_schema_columns() {
        let schema = destination_schema();
        let names: Vec<String> = schema.iter_names().map(|n| n.to_string()).collect();
        assert_eq!(names, FIELD_NAMES.to_vec());
        assert_eq!(schema.get("order_date"), Some(&DataType::Date));
        assert_eq!(schema.get("unit_price"), Some(&DataType::Float64));
        assert_eq!(schema.get("client_id"), Some(&DataType::Int64));
    }

    #[test]
    fn test_epoch_days() {
        assert_eq!(epoch_days("1970-01-01"), Some(0));
        assert_eq!(epoch_days("1970-01-02"), Some(1));
        assert_eq!(epoch_days("1969-12-31"), Some(-1));
        assert_eq!(epoch_days("2025-04-01"), Some(20179));
        assert_eq!(epoch_days("April 1st"), None);
    }

    #[test]
    fn test_dataframe_matches_destination_schema() {
        let records = vec![record("PART-20250401-1", "2025-04-01"), record("PART-20250401-2", "2025-04-02")];
        let df = records_to_dataframe(&records).unwrap();

        assert_eq!(df.height(), 2);
        let names: Vec<&str> = df.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, FIELD_NAMES.to_vec());
        let expected: Vec<DataType> = destination_schema().iter_values().cloned().collect();
        assert_eq!(df.dtypes(), expected);
    }

    #[test]
    fn test_unparseable_dates_become_null() {
        let records = vec![record("A", "2025-04-01"), record("B", "01/04/2025")];
        let df = records_to_dataframe(&records).unwrap();

        let dates = df.column("order_date").unwrap();
        assert_eq!(dates.null_count(), 1);
    }

    #[test]
    fn test_empty_records() {
        let df = records_to_dataframe(&[]).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 8);
    }
}
