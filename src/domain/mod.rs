//! # Domain Layer
//!
//! The entity model of the cache. Independent of the registry and gateway
//! layers: entities know how to build and update themselves from payloads,
//! and nothing else.

pub mod entities;

pub use entities::*;
