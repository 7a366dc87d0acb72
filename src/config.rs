//! Configuration Module
//!
//! Handles loading the shell's defaults from environment variables.

use std::env;

/// Shell configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Capacity used by `NEW <var> MEMSTASH` when no argument is given
    pub default_capacity: i64,
    /// TTL in seconds used by `NEW <var> TIMESTASH` when no argument is given
    pub default_ttl: i64,
    /// Prompt printed before each command when stdin is interactive
    pub prompt: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `STASH_DEFAULT_CAPACITY` - Default MEMSTASH capacity (default: 1000)
    /// - `STASH_DEFAULT_TTL` - Default TIMESTASH TTL in seconds (default: 300)
    /// - `STASH_PROMPT` - Shell prompt (default: `"stash> "`)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_capacity: env::var("STASH_DEFAULT_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_capacity),
            default_ttl: env::var("STASH_DEFAULT_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl),
            prompt: env::var("STASH_PROMPT").unwrap_or(defaults.prompt),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_capacity: 1000,
            default_ttl: 300,
            prompt: "stash> ".to_string(),
        }
    }
}
