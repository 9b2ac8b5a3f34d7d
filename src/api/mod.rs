//! Admin API Client
//!
//! Typed client for the dating platform's admin REST API.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │  endpoints::*  /  compat (grant, search_users)     │  ~60 thin methods
//! ├────────────────────────────────────────────────────┤
//! │  AdminApiClient<T>                                 │  auth, URL guard,
//! │    └── Session (watch channel, SharedStore)        │  status branching
//! ├────────────────────────────────────────────────────┤
//! │  Transport trait  ──  HttpTransport (reqwest)      │  wire
//! └────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use evendating_console::api::{AdminApiClient, HttpTransport, Session};
//!
//! let session = Arc::new(Session::load(store)?);
//! let client = AdminApiClient::new(HttpTransport::new()?, DEFAULT_API_BASE_URL, session);
//! client.login("ops@example.com", &password).await?;
//! let reports = client.get_reports(Some(ReportStatus::Open)).await?;
//! ```

pub mod client;
pub mod compat;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod session;
pub mod transport;
pub mod url;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{AdminApiClient, RequestSpec};
pub use compat::{GrantOutcome, PhaseStatus, UserSearchOutcome};
pub use error::ApiError;
pub use session::{Session, SessionState, LOGIN_ROUTE};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Transport};
pub use url::DEFAULT_API_BASE_URL;
