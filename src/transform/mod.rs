//! Line transform for raw order files
//!
//! Turns one CSV line into an [`OrderRecord`] or nothing. The transform is
//! pure: no I/O, no logging, no state between calls, so a single
//! [`LineTransformer`] can be shared freely across threads.
//!
//! ## Pipeline
//!
//! 1. [`fields::split_fields`] - naive split on `,`
//! 2. [`fields::is_header_row`] - header rows are skipped wherever they occur
//! 3. arity check - exactly 8 fields
//! 4. [`fields::coerce_record`] - trim and coerce, first bad field wins
//! 5. [`validation`] - date and status checks, strict mode only
//!
//! ## Usage
//!
//! ```rust
//! use order_transform::transform::transform;
//!
//! let record = transform("A100,42,7,France,2023-05-01,3,19.99,SHIPPED").unwrap();
//! assert_eq!(record.client_id, 42);
//!
//! assert!(transform("order_id,client_id,product_id,country,order_date,quantity,unit_price,status").is_none());
//! ```

pub mod fields;
pub mod validation;

#[cfg(test)]
pub mod tests;

use crate::config::TransformOptions;
use crate::constants::EXPECTED_FIELD_COUNT;
use crate::error::Result;
use crate::models::{OrderRecord, SkipReason};

use self::fields::{coerce_record, is_header_row, split_fields};

/// Stateless per-line transformer
#[derive(Debug, Clone, Default)]
pub struct LineTransformer {
    options: TransformOptions,
}

impl LineTransformer {
    /// Transformer with default (non-strict) options
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: TransformOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TransformOptions {
        &self.options
    }

    /// Record for a data line, `None` for anything that must not be emitted
    pub fn transform(&self, line: &str) -> Option<OrderRecord> {
        self.transform_with_reason(line).ok()
    }

    /// Same decision as [`transform`](Self::transform), keeping the reason
    /// a line was dropped
    pub fn transform_with_reason(
        &self,
        line: &str,
    ) -> std::result::Result<OrderRecord, SkipReason> {
        let fields = split_fields(line);

        if is_header_row(&fields) {
            return Err(SkipReason::HeaderRow);
        }

        if fields.len() != EXPECTED_FIELD_COUNT {
            return Err(SkipReason::ArityMismatch {
                found: fields.len(),
            });
        }

        let record = coerce_record(&fields)?;

        if self.options.strict {
            validation::validate_record(&record, &self.options)?;
        }

        Ok(record)
    }

    /// Serialized JSON object for a data line, `None` when skipped
    pub fn transform_to_json(&self, line: &str) -> Result<Option<String>> {
        self.transform(line)
            .map(|record| serde_json::to_string(&record))
            .transpose()
            .map_err(Into::into)
    }

    /// Transform raw bytes. Input that is not UTF-8 text is a contract
    /// violation and is returned as an error rather than a skip.
    pub fn transform_bytes(&self, bytes: &[u8]) -> Result<Option<OrderRecord>> {
        let line = std::str::from_utf8(bytes)?;
        Ok(self.transform(line))
    }
}

/// Transform one line with default options
pub fn transform(line: &str) -> Option<OrderRecord> {
    LineTransformer::default().transform(line)
}
