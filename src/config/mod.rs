//! # Configuration Module
//!
//! This module handles application configuration loading and management.
//! Configuration can be loaded from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{environment}.toml)
//! - .env files (via dotenvy)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use chat_client::config::Settings;
//!
//! let settings = Settings::load()?;
//! println!("Keeping up to {} messages", settings.cache.message_cache_size);
//! ```

mod settings;

pub use settings::*;
