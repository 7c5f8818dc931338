//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Cache sizing configuration
    pub cache: CacheSettings,

    /// Gateway event handling configuration
    pub gateway: GatewaySettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Cache sizing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// Maximum number of messages retained before the least recently used
    /// one is evicted
    pub message_cache_size: usize,

    /// Maximum number of direct-message channels retained
    pub dm_channel_cache_size: usize,
}

/// Gateway event handling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySettings {
    /// Capacity of the broadcast channel dispatched events are queued on
    pub event_buffer_size: usize,
}

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. Environment variables (highest priority)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        // Determine the running environment
        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());

        Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("cache.message_cache_size", 100)?
            .set_default("cache.dm_channel_cache_size", 100)?
            .set_default("gateway.event_buffer_size", 1024)?
            // Load from config files
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Load from environment variables
            // APP__CACHE__MESSAGE_CACHE_SIZE=500 -> cache.message_cache_size = 500
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            cache: CacheSettings {
                message_cache_size: 100,
                dm_channel_cache_size: 100,
            },
            gateway: GatewaySettings {
                event_buffer_size: 1024,
            },
            environment: "development".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.cache.message_cache_size, 100);
        assert_eq!(settings.cache.dm_channel_cache_size, 100);
        assert_eq!(settings.gateway.event_buffer_size, 1024);
    }
}
