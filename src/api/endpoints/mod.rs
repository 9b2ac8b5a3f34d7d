//! Endpoint methods of [`AdminApiClient`](super::AdminApiClient), grouped by
//! console area. Each method maps onto exactly one REST call unless its
//! documentation says otherwise.

mod abuse;
mod admins;
mod entitlements;
mod export;
mod flags;
mod matches;
mod photos;
mod reports;
mod reviews;
mod system;
mod users;

pub use system::DEFAULT_LOG_LIMIT;
