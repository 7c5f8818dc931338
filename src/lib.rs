//! # Chat Client State Library
//!
//! This crate keeps an in-memory relational cache of a chat platform's
//! gateway state:
//! - A state registry holding guilds, channels, users, members, roles,
//!   emoji, and messages as shared mutable cells
//! - A gateway event adapter reconciling raw gateway events into the
//!   registry and dispatching typed notifications
//!
//! ## Module Structure
//!
//! ```text
//! chat_client/
//! +-- config/     Configuration management
//! +-- domain/     Entity model (guilds, channels, users, ...)
//! +-- registry/   State registry trait and in-memory implementation
//! +-- gateway/    Event kinds, typed events, and the event adapter
//! +-- shared/     Common utilities (errors, snowflake IDs, payloads)
//! ```

// Configuration module
pub mod config;

// Domain layer - entity model
pub mod domain;

// State registry - the cache proper
pub mod registry;

// Gateway layer - event reconciliation and dispatch
pub mod gateway;

// Shared utilities
pub mod shared;

// Telemetry and observability
pub mod telemetry;
