//! Rate Limit Configuration
//!
//! Window and budget settings for the client-side form limiters.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Default window length (15 minutes)
pub const DEFAULT_WINDOW_SECS: u64 = 15 * 60;

/// Default submissions allowed per window
pub const DEFAULT_MAX_REQUESTS: u32 = 5;

/// Settings for a single named limiter, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimiterConfig {
    /// Length of one fixed window
    pub window: Duration,

    /// Requests allowed while the window is open
    pub max_requests: u32,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(DEFAULT_WINDOW_SECS),
            max_requests: DEFAULT_MAX_REQUESTS,
        }
    }
}

impl RateLimiterConfig {
    /// Create a config with an explicit window and budget
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            window,
            max_requests,
        }
    }

    /// Window length in milliseconds, as stored in `resetTime`
    pub fn window_millis(&self) -> i64 {
        i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX)
    }
}

/// `[rate_limits]` section of the config file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Default window in seconds
    pub window_secs: u64,

    /// Default submissions per window
    pub max_requests: u32,

    /// Per-limiter overrides, keyed by limiter identifier
    pub overrides: HashMap<String, LimiterOverride>,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_WINDOW_SECS,
            max_requests: DEFAULT_MAX_REQUESTS,
            overrides: HashMap::new(),
        }
    }
}

impl RateLimitConfig {
    /// Resolve the effective settings for a limiter identifier
    pub fn for_key(&self, key: &str) -> RateLimiterConfig {
        let over = self.overrides.get(key);
        let window_secs = over
            .and_then(|o| o.window_secs)
            .unwrap_or(self.window_secs);
        let max_requests = over
            .and_then(|o| o.max_requests)
            .unwrap_or(self.max_requests);

        RateLimiterConfig::new(Duration::from_secs(window_secs), max_requests)
    }
}

/// Override for one limiter identifier
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LimiterOverride {
    /// Window override in seconds
    pub window_secs: Option<u64>,

    /// Budget override
    pub max_requests: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limiter_config() {
        let config = RateLimiterConfig::default();
        assert_eq!(config.window, Duration::from_secs(900));
        assert_eq!(config.max_requests, 5);
        assert_eq!(config.window_millis(), 900_000);
    }

    #[test]
    fn test_for_key_uses_defaults() {
        let config = RateLimitConfig::default();
        assert_eq!(
            config.for_key("contact-form-rate-limit"),
            RateLimiterConfig::default()
        );
    }

    #[test]
    fn test_for_key_applies_partial_override() {
        let mut config = RateLimitConfig::default();
        config.overrides.insert(
            "support-ticket-rate-limit".to_string(),
            LimiterOverride {
                window_secs: None,
                max_requests: Some(2),
            },
        );

        let resolved = config.for_key("support-ticket-rate-limit");
        assert_eq!(resolved.max_requests, 2);
        assert_eq!(resolved.window, Duration::from_secs(DEFAULT_WINDOW_SECS));
    }

    #[test]
    fn test_config_toml_round_trip() {
        let parsed: RateLimitConfig = toml::from_str(
            r#"
            window_secs = 60
            [overrides.contact-form-rate-limit]
            max_requests = 3
            "#,
        )
        .unwrap();

        assert_eq!(parsed.window_secs, 60);
        assert_eq!(parsed.max_requests, DEFAULT_MAX_REQUESTS);
        assert_eq!(parsed.for_key("contact-form-rate-limit").max_requests, 3);
    }
}
