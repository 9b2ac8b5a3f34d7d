//! Fixed-Window Rate Limiter
//!
//! Bounds the number of submissions for a named action within a fixed window,
//! using only the client-local store.
//!
//! # Caller contract
//!
//! [`RateLimiter::can_make_request`] consumes a slot when it returns `true`.
//! [`RateLimiter::record_request`] consumes a slot unconditionally. A single
//! logical action must use exactly one of the two, otherwise it is counted twice.

use serde::Serialize;
use std::sync::Arc;

use super::clock::{Clock, SystemClock};
use super::config::RateLimiterConfig;
use super::store::{RateLimitEntry, WindowStore};
use crate::storage::{KeyValueStore, SharedStore};

/// Limiter identifier used by the public contact form
pub const CONTACT_FORM_LIMITER: &str = "contact-form-rate-limit";

/// Limiter identifier used by the suggestions form
pub const SUGGESTIONS_FORM_LIMITER: &str = "suggestions-form-rate-limit";

/// Limiter identifier used by support ticket submission
pub const SUPPORT_TICKET_LIMITER: &str = "support-ticket-rate-limit";

/// Suffix shared by every limiter identifier
pub const LIMITER_KEY_SUFFIX: &str = "-rate-limit";

/// Limiter identifiers that have a window record in `store`, sorted
///
/// A store that cannot be listed yields no identifiers.
pub fn stored_limiter_keys(store: &dyn KeyValueStore) -> Vec<String> {
    let mut keys: Vec<String> = match store.keys() {
        Ok(keys) => keys
            .into_iter()
            .filter(|k| k.ends_with(LIMITER_KEY_SUFFIX))
            .collect(),
        Err(e) => {
            tracing::warn!("Failed to list rate limit records: {}", e);
            Vec::new()
        }
    };
    keys.sort();
    keys
}

/// Read-only snapshot of a limiter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitStatus {
    /// Limiter identifier
    pub key: String,

    /// Configured budget per window
    pub limit: u32,

    /// Requests counted in the active window (0 when none is active)
    pub used: u32,

    /// Requests still allowed in the active window
    pub remaining: u32,

    /// Seconds until the window resets (0 when none is active)
    pub retry_after_secs: u64,

    /// Whether a window is currently open
    pub window_active: bool,
}

/// Client-local fixed-window limiter
#[derive(Clone)]
pub struct RateLimiter {
    windows: WindowStore,
    config: RateLimiterConfig,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a limiter for `key` using the system clock
    pub fn new(key: impl Into<String>, config: RateLimiterConfig, store: SharedStore) -> Self {
        Self::with_clock(key, config, store, Arc::new(SystemClock))
    }

    /// Create a limiter with an explicit clock
    pub fn with_clock(
        key: impl Into<String>,
        config: RateLimiterConfig,
        store: SharedStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            windows: WindowStore::new(store, key),
            config,
            clock,
        }
    }

    /// Limiter identifier
    pub fn key(&self) -> &str {
        self.windows.key()
    }

    /// Effective configuration
    pub fn config(&self) -> RateLimiterConfig {
        self.config
    }

    /// Check the budget and, if allowed, consume one slot
    ///
    /// Returns `false` without touching the stored entry once the window's
    /// budget is exhausted.
    pub fn can_make_request(&self) -> bool {
        let now = self.clock.now_millis();
        let current = self.windows.load();

        if let Some(entry) = current {
            if !entry.is_expired(now) && entry.count >= self.config.max_requests {
                tracing::debug!(
                    "Rate limit reached for {} ({}/{})",
                    self.key(),
                    entry.count,
                    self.config.max_requests
                );
                return false;
            }
        }

        self.store_next(current, now);
        true
    }

    /// Consume one slot unconditionally, opening a new window if needed
    pub fn record_request(&self) {
        let now = self.clock.now_millis();
        let current = self.windows.load();
        self.store_next(current, now);
    }

    /// Whole seconds (rounded up) until the window resets
    pub fn time_remaining(&self) -> u64 {
        let Some(entry) = self.windows.load() else {
            return 0;
        };

        let remaining = entry
            .reset_time
            .saturating_sub(self.clock.now_millis())
            .max(0);
        // ceil(ms / 1000)
        (remaining as u64).div_ceil(1000)
    }

    /// Requests still allowed in the current window
    pub fn remaining_requests(&self) -> u32 {
        let now = self.clock.now_millis();
        match self.windows.load() {
            Some(entry) if !entry.is_expired(now) => {
                self.config.max_requests.saturating_sub(entry.count)
            }
            _ => self.config.max_requests,
        }
    }

    /// Drop any stored window for this limiter
    pub fn reset(&self) {
        tracing::debug!("Resetting rate limiter {}", self.key());
        self.windows.clear();
    }

    /// Snapshot without mutating state
    pub fn status(&self) -> RateLimitStatus {
        let now = self.clock.now_millis();
        let active = self.windows.load().filter(|e| !e.is_expired(now));
        let used = active.map(|e| e.count).unwrap_or(0);

        RateLimitStatus {
            key: self.key().to_string(),
            limit: self.config.max_requests,
            used,
            remaining: self.config.max_requests.saturating_sub(used),
            retry_after_secs: if active.is_some() {
                self.time_remaining()
            } else {
                0
            },
            window_active: active.is_some(),
        }
    }

    fn store_next(&self, current: Option<RateLimitEntry>, now: i64) {
        let next = match current {
            Some(entry) if !entry.is_expired(now) => RateLimitEntry {
                count: entry.count.saturating_add(1),
                reset_time: entry.reset_time,
            },
            _ => RateLimitEntry::fresh(now, self.config.window_millis()),
        };

        tracing::trace!(
            "Rate limiter {} count={} reset_time={}",
            self.key(),
            next.count,
            next.reset_time
        );
        self.windows.save(&next);
    }
}

/// Render a wait as `m:ss`
pub fn format_wait(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
