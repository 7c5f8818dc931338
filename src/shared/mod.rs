//! Shared Utilities
//!
//! Common utilities used across all layers.

pub mod error;
pub mod payload;
pub mod snowflake;
