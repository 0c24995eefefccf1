//! Field splitting and numeric coercion for raw order lines
//!
//! Every coercion returns a `Result` naming the offending field, so a whole
//! record either coerces cleanly or short-circuits on the first bad field.

use crate::constants::{FIELD_DELIMITER, HEADER_SENTINELS};
use crate::models::{OrderRecord, SkipReason};

/// Split a raw line on the literal delimiter.
///
/// No quote or escape handling: `"New York, NY"` becomes two fields.
pub fn split_fields(line: &str) -> Vec<&str> {
    line.split(FIELD_DELIMITER).collect()
}

/// Strip surrounding whitespace and byte-order marks.
///
/// A file saved with a UTF-8 BOM carries U+FEFF at the start of its first
/// field, which `str::trim` keeps.
pub fn trim_field(raw: &str) -> &str {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// True when the first two fields read `order_id` and `client_id`,
/// ignoring case and surrounding whitespace.
///
/// Checked on every line, not only the first one of a file.
pub fn is_header_row(fields: &[&str]) -> bool {
    match fields {
        [first, second, ..] => {
            trim_field(first).eq_ignore_ascii_case(HEADER_SENTINELS[0])
                && trim_field(second).eq_ignore_ascii_case(HEADER_SENTINELS[1])
        }
        _ => false,
    }
}

/// Base-10 integer with an optional leading sign.
///
/// A fractional part is accepted and truncated toward zero (`3.5` is 3,
/// `-3.7` is -3), but at least one digit must precede the decimal point.
pub fn parse_integer(field: &'static str, raw: &str) -> Result<i64, SkipReason> {
    let value = trim_field(raw);
    let failure = || SkipReason::NumericCoercionFailure {
        field,
        value: value.to_string(),
    };

    if !is_plain_decimal(value) {
        return Err(failure());
    }

    let integer_part = value.split('.').next().unwrap_or(value);
    if !integer_part.ends_with(|c: char| c.is_ascii_digit()) {
        return Err(failure());
    }
    integer_part.parse::<i64>().map_err(|_| failure())
}

/// Plain decimal: optional sign, digits, at most one decimal point.
///
/// Exponents, `inf`, `NaN`, currency symbols and thousands separators are
/// all rejected even where `f64::from_str` would accept them.
pub fn parse_decimal(field: &'static str, raw: &str) -> Result<f64, SkipReason> {
    let value = trim_field(raw);
    let failure = || SkipReason::NumericCoercionFailure {
        field,
        value: value.to_string(),
    };

    if !is_plain_decimal(value) {
        return Err(failure());
    }
    value.parse::<f64>().map_err(|_| failure())
}

fn is_plain_decimal(value: &str) -> bool {
    let unsigned = value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value);

    let mut digits = 0;
    let mut points = 0;
    for c in unsigned.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return false,
        }
    }
    digits > 0 && points <= 1
}

/// Coerce exactly eight raw fields into a typed record
pub fn coerce_record(fields: &[&str]) -> Result<OrderRecord, SkipReason> {
    let &[
        order_id,
        client_id,
        product_id,
        country,
        order_date,
        quantity,
        unit_price,
        status,
    ] = fields
    else {
        return Err(SkipReason::ArityMismatch {
            found: fields.len(),
        });
    };

    Ok(OrderRecord {
        order_id: trim_field(order_id).to_string(),
        client_id: parse_integer("client_id", client_id)?,
        product_id: parse_integer("product_id", product_id)?,
        country: trim_field(country).to_string(),
        order_date: trim_field(order_date).to_string(),
        quantity: parse_integer("quantity", quantity)?,
        unit_price: parse_decimal("unit_price", unit_price)?,
        status: trim_field(status).to_string(),
    })
}
