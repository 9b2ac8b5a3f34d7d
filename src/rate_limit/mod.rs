//! Client-Side Rate Limiting
//!
//! This module throttles public form submissions with a fixed-window counter
//! persisted in the client-local key/value store. There is no server
//! coordination: the limiter only protects against a single client
//! resubmitting too often.
//!
//! # Features
//!
//! - One persisted `{count, resetTime}` record per named limiter
//! - Configurable window and budget, with per-limiter overrides
//! - Corrupt or unreadable records reset to a fresh window instead of failing
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │              RateLimiter                 │
//! │  can_make_request / record_request       │
//! ├──────────────────────────────────────────┤
//! │  WindowStore  ──►  SharedStore (JSON)    │
//! │  Clock (system | manual)                 │
//! └──────────────────────────────────────────┘
//! ```

pub mod clock;
pub mod config;
pub mod limiter;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{RateLimitConfig, RateLimiterConfig};
pub use limiter::{
    format_wait, stored_limiter_keys, RateLimitStatus, RateLimiter, CONTACT_FORM_LIMITER,
    LIMITER_KEY_SUFFIX, SUGGESTIONS_FORM_LIMITER, SUPPORT_TICKET_LIMITER,
};
pub use store::{RateLimitEntry, WindowStore};

#[cfg(test)]
mod proptests;
