//! Strict-mode checks applied after a record has coerced.
//!
//! Mirrors what the batch loader enforced before inserting rows: a real
//! calendar date and a known order status.

use crate::config::TransformOptions;
use crate::constants::ORDER_DATE_FORMAT;
use crate::models::{OrderRecord, SkipReason};
use chrono::NaiveDate;

pub fn validate_order_date(value: &str) -> Result<NaiveDate, SkipReason> {
    NaiveDate::parse_from_str(value, ORDER_DATE_FORMAT).map_err(|_| {
        SkipReason::InvalidOrderDate {
            value: value.to_string(),
        }
    })
}

pub fn validate_status(value: &str, allowed: &[String]) -> Result<(), SkipReason> {
    if allowed.iter().any(|status| status == value) {
        Ok(())
    } else {
        Err(SkipReason::UnknownStatus {
            value: value.to_string(),
        })
    }
}

pub fn validate_record(record: &OrderRecord, options: &TransformOptions) -> Result<(), SkipReason> {
    validate_order_date(&record.order_date)?;
    validate_status(&record.status, &options.allowed_statuses)
}
