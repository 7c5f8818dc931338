//! Snowflake ID Handling
//!
//! The gateway transmits 64-bit entity ids as decimal strings so that
//! number-based transports cannot lose precision. Every ingestion boundary in
//! the cache converts those strings back to `i64` through this module.

use serde_json::Value;

use crate::shared::error::CacheError;

/// Discord epoch (2015-01-01T00:00:00.000Z)
const DISCORD_EPOCH: u64 = 1420070400000;

/// Parse a snowflake from a JSON value that may be a decimal string or a
/// bare number.
pub fn parse_id(field: &'static str, value: &Value) -> Result<i64, CacheError> {
    match value {
        Value::String(s) => s
            .parse::<i64>()
            .map_err(|_| CacheError::malformed_id(field, value)),
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| CacheError::malformed_id(field, value)),
        _ => Err(CacheError::malformed_id(field, value)),
    }
}

/// Parse a snowflake from a string slice.
pub fn from_string(s: &str) -> Result<i64, std::num::ParseIntError> {
    s.parse()
}

/// Convert snowflake to string (for JSON serialization)
pub fn to_string(snowflake: i64) -> String {
    snowflake.to_string()
}

/// Extract the creation timestamp (milliseconds since the Unix epoch) from a
/// snowflake ID.
pub fn extract_timestamp(snowflake: i64) -> u64 {
    ((snowflake as u64) >> 22) + DISCORD_EPOCH
}
