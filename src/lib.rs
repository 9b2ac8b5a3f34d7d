//! Even Dating Console Library
//!
//! This library provides the client-side pieces of the Even Dating operator
//! tooling: a typed client for the admin REST API with an explicit session,
//! and the fixed-window limiter and validation that guard the public forms.

pub mod api;
pub mod config;
pub mod forms;
pub mod rate_limit;
pub mod storage;
