//! Property-Based Tests for the Form Rate Limiter
//!
//! # Properties
//!
//! - **Budget**: the stored count never exceeds the budget through
//!   `can_make_request` alone, whatever the call/advance interleaving
//! - **Accounting**: `remaining_requests` always equals `max - count` for an
//!   active window
//! - **Countdown**: `time_remaining` never exceeds the window length
//!
//! # Running the Tests
//!
//! ```bash
//! cargo test --lib rate_limit::proptests
//! ```

use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use crate::rate_limit::clock::{Clock, ManualClock};
use crate::rate_limit::config::RateLimiterConfig;
use crate::rate_limit::limiter::RateLimiter;
use crate::rate_limit::store::RateLimitEntry;
use crate::storage::{KeyValueStore, MemoryStore};

#[derive(Debug, Clone)]
enum Step {
    Check,
    Advance(u64),
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => Just(Step::Check),
        1 => (0u64..120_000).prop_map(Step::Advance),
    ]
}

proptest! {
    #[test]
    fn prop_count_never_exceeds_budget(
        max in 1u32..10,
        window_secs in 1u64..120,
        steps in prop::collection::vec(arb_step(), 1..60)
    ) {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        let limiter = RateLimiter::with_clock(
            "prop-limiter",
            RateLimiterConfig::new(Duration::from_secs(window_secs), max),
            Arc::new(store.clone()),
            Arc::new(clock.clone()),
        );

        for step in steps {
            match step {
                Step::Check => {
                    let before = limiter.remaining_requests();
                    let allowed = limiter.can_make_request();
                    prop_assert_eq!(allowed, before > 0);
                }
                Step::Advance(ms) => clock.advance(Duration::from_millis(ms)),
            }

            if let Some(raw) = store.get("prop-limiter").unwrap() {
                let entry: RateLimitEntry = serde_json::from_str(&raw).unwrap();
                prop_assert!(entry.count <= max);
                if !entry.is_expired(clock.now_millis()) {
                    prop_assert_eq!(limiter.remaining_requests(), max - entry.count);
                }
            }

            prop_assert!(limiter.time_remaining() <= window_secs);
        }
    }
}
