//! Configuration Module
//!
//! Handles loading `entryctl` settings from environment variables.

use std::env;

use crate::cache::Ttl;

/// Default tracing filter when neither `RUST_LOG` nor `ENTRY_LOG_FILTER` is set.
pub const DEFAULT_LOG_FILTER: &str = "cache_entry=info,entryctl=info";

/// Tool configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// TTL applied when a command is not given one, `None` = never expires
    pub default_ttl: Option<String>,
    /// Tracing filter directive
    pub log_filter: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `ENTRY_DEFAULT_TTL` - Offset in ms or date string (default: unset)
    /// - `ENTRY_LOG_FILTER` - Tracing filter (default: `cache_entry=info,entryctl=info`)
    ///
    /// Empty values count as unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: non_empty_var("ENTRY_DEFAULT_TTL"),
            log_filter: non_empty_var("ENTRY_LOG_FILTER").unwrap_or(defaults.log_filter),
        }
    }

    /// The TTL to use when a command does not supply one.
    pub fn default_ttl(&self) -> Ttl {
        Ttl::from(self.default_ttl.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.default_ttl.is_none());
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(config.default_ttl(), Ttl::None);
    }

    #[test]
    fn test_config_from_env() {
        env::set_var("ENTRY_DEFAULT_TTL", "60000");
        env::set_var("ENTRY_LOG_FILTER", "  ");

        let config = Config::from_env();
        assert_eq!(config.default_ttl.as_deref(), Some("60000"));
        assert_eq!(config.default_ttl(), Ttl::Raw("60000".to_string()));
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);

        env::remove_var("ENTRY_DEFAULT_TTL");
        env::remove_var("ENTRY_LOG_FILTER");

        let config = Config::from_env();
        assert_eq!(config, Config::default());
    }
}
