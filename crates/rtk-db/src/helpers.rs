//! Row-to-entity parsing helpers.
//!
//! Every repo converts `libsql::Row` (column-indexed) into typed entity
//! structs. These helpers isolate the parsing logic and handle the dual
//! datetime format issue (`SQLite`'s `datetime('now')` vs Rust's
//! `to_rfc3339()`).

use chrono::{DateTime, Utc};

use crate::error::DatabaseError;

/// Parse a required TEXT column as `DateTime<Utc>`.
///
/// Handles both RFC 3339 (`"2026-02-09T14:30:00+00:00"`) and `SQLite`'s
/// default format (`"2026-02-09 14:30:00"`).
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string cannot be parsed as either
/// format.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("Failed to parse datetime '{s}': {e}")))
}

/// Read a nullable TEXT column. Returns `None` for both SQL NULL and empty
/// string.
///
/// `row.get::<String>(idx)` on a NULL column returns an error, not `""`.
/// Nullable columns must be read with `get::<Option<String>>()`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Parse a TEXT column into a serde-deserializable enum.
///
/// Works with the rtk-core enums, which serialize as plain strings.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the string does not match any enum
/// variant.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("Failed to parse enum from '{s}': {e}")))
}

/// Deserialize a JSON TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if the column contains invalid JSON for the
/// target type.
pub fn parse_json<T: serde::de::DeserializeOwned>(
    s: &str,
    column: &str,
) -> Result<T, DatabaseError> {
    serde_json::from_str(s)
        .map_err(|e| DatabaseError::Query(format!("Invalid JSON in {column}: {e}")))
}

/// Serialize a value for storage in a JSON TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Other` if serialization fails.
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|e| DatabaseError::Other(e.into()))
}

/// Check a caller-supplied id against the store's id format.
///
/// # Errors
///
/// Returns `DatabaseError::BadIdentifier` on mismatch.
pub fn ensure_id(id: &str, prefix: &str) -> Result<(), DatabaseError> {
    if rtk_core::ids::is_valid_id(id, prefix) {
        Ok(())
    } else {
        Err(DatabaseError::BadIdentifier { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2026-02-09T14:30:00+00:00", true)]
    #[case("2026-02-09T14:30:00Z", true)]
    #[case("2026-02-09 14:30:00", true)]
    #[case("2026-02-09", false)]
    #[case("nonsense", false)]
    fn parse_datetime_accepts_both_formats(#[case] input: &str, #[case] ok: bool) {
        assert_eq!(parse_datetime(input).is_ok(), ok, "input: {input}");
    }

    #[test]
    fn ensure_id_rejects_malformed() {
        assert!(ensure_id("std-a3f8b2c1", "std").is_ok());
        let err = ensure_id("not-an-id", "std").unwrap_err();
        assert!(matches!(err, DatabaseError::BadIdentifier { .. }));
    }
}
