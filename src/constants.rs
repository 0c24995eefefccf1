//! Application constants for the order transform
//!
//! Field layout of the raw order files, header sentinels, validation sets
//! and driver defaults.

// =============================================================================
// Raw Line Layout
// =============================================================================

/// Field delimiter. Splitting is literal, with no quote or escape handling.
pub const FIELD_DELIMITER: char = ',';

/// Number of positional fields in every data line
pub const EXPECTED_FIELD_COUNT: usize = 8;

/// Positional field names, in file order
pub const FIELD_NAMES: [&str; EXPECTED_FIELD_COUNT] = [
    "order_id",
    "client_id",
    "product_id",
    "country",
    "order_date",
    "quantity",
    "unit_price",
    "status",
];

/// Lowercased sentinels for fields 0 and 1 of a header row
pub const HEADER_SENTINELS: [&str; 2] = ["order_id", "client_id"];

// =============================================================================
// Strict Validation
// =============================================================================

/// Expected `order_date` format
pub const ORDER_DATE_FORMAT: &str = "%Y-%m-%d";

/// Order statuses accepted by the loader in strict mode
pub const DEFAULT_ALLOWED_STATUSES: &[&str] = &["PAID", "CANCELLED"];

// =============================================================================
// Driver Defaults
// =============================================================================

/// Glob pattern (relative to the input directory) for raw order files
pub const DEFAULT_FILE_PATTERN: &str = "**/*.csv";

/// Default Parquet row group size (rows)
pub const DEFAULT_ROW_GROUP_SIZE: usize = 250_000;

/// Default output file names per sink
pub const DEFAULT_PARQUET_OUTPUT: &str = "orders.parquet";
pub const DEFAULT_NDJSON_OUTPUT: &str = "orders.ndjson";
