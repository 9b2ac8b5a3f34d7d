//! Admin API error types

use crate::storage::StorageError;

/// Errors surfaced by [`AdminApiClient`](super::AdminApiClient) calls
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No bearer token in the credential store; no request was sent
    #[error("Not authenticated")]
    Unauthenticated,

    /// Endpoint path or resolved URL carries credential-like text
    #[error("Invalid {0}: credentials should not be in the URL path")]
    CredentialInUrl(&'static str),

    /// Server answered 401; stored credentials were cleared
    #[error("Authentication expired. Please log in again.")]
    AuthenticationExpired,

    /// Server answered 404
    #[error("{0}")]
    NotFound(String),

    /// Server answered 500
    #[error("{0}")]
    Server(String),

    /// Any other non-2xx answer
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Login was refused or returned no token
    #[error("{0}")]
    LoginFailed(String),

    /// Success body did not match the expected schema
    #[error("Unexpected response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// Request could not be delivered
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: anyhow::Error,
    },

    /// Credential store could not be read or written
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// Session-level failures that must reach the caller even from
    /// operations that otherwise degrade gracefully
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Unauthenticated | ApiError::AuthenticationExpired)
    }

    /// HTTP status associated with the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::AuthenticationExpired => Some(401),
            ApiError::NotFound(_) => Some(404),
            ApiError::Server(_) => Some(500),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
