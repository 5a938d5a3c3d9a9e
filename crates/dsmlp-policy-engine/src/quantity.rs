//! Integer interpretation of Kubernetes resource quantities.
//!
//! Extended resources such as GPUs only accept whole numbers, hence anything
//! that is not a plain non-negative integer is counted as zero instead of
//! being rejected.

use serde_json::Value;

/// Parse a quantity given as a string, like the ones stored by the API server.
/// Integers beyond the `i64` range saturate to `i64::MAX`.
pub fn units_from_str(raw: &str) -> i64 {
    let raw = raw.trim();
    match raw.parse::<i64>() {
        Ok(units) => units.max(0),
        Err(_) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => i64::MAX,
        Err(_) => 0,
    }
}

/// Parse a quantity found inside of a JSON document. Both numbers and
/// strings are accepted.
///
/// Fractional numbers are truncated. Numbers beyond the `i64` range saturate
/// to `i64::MAX` on purpose: such a Pod can never fit inside of a quota, as
/// long as callers add quantities with saturating arithmetic.
pub fn units_from_value(value: &Value) -> i64 {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|units| units.trunc() as i64))
            .unwrap_or(0)
            .max(0),
        Value::String(raw) => units_from_str(raw),
        _ => 0,
    }
}
