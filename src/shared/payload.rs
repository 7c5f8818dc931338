//! Payload Field Extraction
//!
//! Helpers for picking typed fields out of decoded gateway payloads
//! (string-keyed `serde_json::Value` maps). Required-field accessors return
//! `CacheError` so that one malformed event aborts with a diagnostic instead
//! of poisoning the cache; optional accessors return `None` for absent or
//! null fields, which is what gives `update_state` its partial-update
//! semantics.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::shared::error::CacheError;
use crate::shared::snowflake;

/// Get a required sub-object or value.
pub fn require<'a>(payload: &'a Value, field: &'static str) -> Result<&'a Value, CacheError> {
    payload.get(field).ok_or(CacheError::MissingField(field))
}

/// Get a required snowflake id field.
pub fn require_id(payload: &Value, field: &'static str) -> Result<i64, CacheError> {
    let value = require(payload, field)?;
    snowflake::parse_id(field, value)
}

/// Get an optional snowflake id field. Absent, null, and malformed values all
/// read as `None`; upstream omits ids inconsistently on some event kinds.
pub fn optional_id(payload: &Value, field: &'static str) -> Option<i64> {
    match payload.get(field) {
        Some(Value::Null) | None => None,
        Some(value) => snowflake::parse_id(field, value).ok(),
    }
}

/// Get an optional string field (absent and null both read as `None`).
pub fn string_field(payload: &Value, field: &str) -> Option<String> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Get an optional boolean field.
pub fn bool_field(payload: &Value, field: &str) -> Option<bool> {
    payload.get(field).and_then(Value::as_bool)
}

/// Get an optional integer field.
pub fn int_field(payload: &Value, field: &str) -> Option<i64> {
    payload.get(field).and_then(Value::as_i64)
}

/// Get an optional unsigned integer field (permission bitfields, flags).
pub fn uint_field(payload: &Value, field: &str) -> Option<u64> {
    match payload.get(field) {
        Some(Value::Number(n)) => n.as_u64(),
        // Permission bitfields are also sent as decimal strings.
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}

/// Get an optional list of snowflake ids, skipping unparseable entries.
pub fn id_list(payload: &Value, field: &str) -> Option<Vec<i64>> {
    let items = payload.get(field)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| snowflake::parse_id("id", item).ok())
            .collect(),
    )
}

/// Get an optional list of string values.
pub fn string_list(payload: &Value, field: &str) -> Option<Vec<String>> {
    let items = payload.get(field)?.as_array()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_owned)
            .collect(),
    )
}

/// Get an optional RFC 3339 timestamp field.
pub fn timestamp_field(payload: &Value, field: &str) -> Option<DateTime<Utc>> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// True if the field is present with a non-null value.
pub fn has_field(payload: &Value, field: &str) -> bool {
    matches!(payload.get(field), Some(v) if !v.is_null())
}
