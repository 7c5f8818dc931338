//! Library Error Types
//!
//! Centralized error handling for payload parsing and configuration.
//!
//! Referential absence (a lookup that finds nothing, an update for an entity
//! that was never cached) is *not* an error anywhere in this crate; those
//! paths return `Option::None`. Errors are reserved for payloads that violate
//! the wire contract (missing required fields, ids that do not parse) and for
//! configuration failures.

use serde::Serialize;

/// Cache/client error type
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Malformed id in field {field}: {value}")]
    MalformedId { field: &'static str, value: String },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl CacheError {
    /// Build a `MalformedId` from the offending JSON value.
    pub fn malformed_id(field: &'static str, value: &serde_json::Value) -> Self {
        CacheError::MalformedId {
            field,
            value: value.to_string(),
        }
    }
}

/// Serializable error report, used when surfacing a dropped event to
/// application callbacks or diagnostics endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub code: u16,
    pub message: String,
}

impl From<&CacheError> for ErrorReport {
    fn from(err: &CacheError) -> Self {
        let code = match err {
            CacheError::MissingField(_) => 20001,
            CacheError::MalformedId { .. } => 20002,
            CacheError::MalformedPayload(_) => 20003,
            CacheError::Config(_) => 20000,
        };
        ErrorReport {
            code,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display() {
        let err = CacheError::MissingField("guild_id");
        assert_eq!(err.to_string(), "Missing required field: guild_id");
    }

    #[test]
    fn test_malformed_id_display() {
        let err = CacheError::malformed_id("id", &serde_json::json!("abc"));
        assert_eq!(err.to_string(), "Malformed id in field id: \"abc\"");
    }

    #[test]
    fn test_error_report_codes() {
        let report = ErrorReport::from(&CacheError::MissingField("id"));
        assert_eq!(report.code, 20001);

        let report = ErrorReport::from(&CacheError::MalformedPayload("oops".into()));
        assert_eq!(report.code, 20003);
    }
}
