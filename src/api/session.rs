//! Admin Session
//!
//! Explicit session object for the admin console. The bearer token and the
//! account email live in the shared key/value store (`admin_token`,
//! `admin_email`) so that they survive restarts; the session state machine is
//! published on a watch channel so callers can react to expiry.
//!
//! # State machine
//!
//! ```text
//!             establish()                401 / expire()
//! Anonymous ─────────────► Authenticated ───────────────► Expired
//!     ▲                        │                            │
//!     └──────── logout() ──────┴──────── establish() ◄──────┘
//! ```

use serde::Serialize;
use tokio::sync::watch;

use super::error::ApiError;
use crate::storage::{SharedStore, StorageError};

/// Store key of the bearer token
pub const TOKEN_KEY: &str = "admin_token";

/// Store key of the signed-in account email
pub const EMAIL_KEY: &str = "admin_email";

/// Entry point a UI should navigate to once the session expires
pub const LOGIN_ROUTE: &str = "/admin/login";

/// Session state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    /// No credentials stored
    Anonymous,

    /// Credentials stored for `email`
    Authenticated { email: String },

    /// Server rejected the credentials; they have been cleared
    Expired,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Anonymous => write!(f, "Anonymous"),
            SessionState::Authenticated { email } => write!(f, "Authenticated ({})", email),
            SessionState::Expired => write!(f, "Expired"),
        }
    }
}

/// Credential holder shared by API calls
pub struct Session {
    store: SharedStore,
    state: watch::Sender<SessionState>,
}

impl Session {
    /// Load any stored credentials
    ///
    /// An unreadable namespace starts the session anonymous; the next
    /// `establish` overwrites it.
    pub fn load(store: SharedStore) -> Result<Self, ApiError> {
        let (token, email) = match (store.get(TOKEN_KEY), store.get(EMAIL_KEY)) {
            (Ok(token), Ok(email)) => (token, email),
            (Err(StorageError::Corrupt { path, reason }), _)
            | (_, Err(StorageError::Corrupt { path, reason })) => {
                tracing::warn!("Ignoring credentials in corrupt {:?}: {}", path, reason);
                (None, None)
            }
            (Err(e), _) | (_, Err(e)) => return Err(e.into()),
        };

        let initial = match (token, email) {
            (Some(_), Some(email)) => SessionState::Authenticated { email },
            _ => SessionState::Anonymous,
        };
        tracing::debug!("Session loaded: {}", initial);

        let (state, _) = watch::channel(initial);
        Ok(Self { store, state })
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Signed-in account, if any
    pub fn email(&self) -> Option<String> {
        match &*self.state.borrow() {
            SessionState::Authenticated { email } => Some(email.clone()),
            _ => None,
        }
    }

    /// Read the bearer token from the store
    ///
    /// Read fresh on every call so another process logging out is noticed.
    pub fn bearer_token(&self) -> Result<String, ApiError> {
        match self.store.get(TOKEN_KEY)? {
            Some(token) if !token.is_empty() => Ok(token),
            _ => Err(ApiError::Unauthenticated),
        }
    }

    /// Persist fresh credentials and enter `Authenticated`
    pub fn establish(&self, token: &str, email: &str) -> Result<(), ApiError> {
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(EMAIL_KEY, email)?;
        tracing::info!("Admin session established for {}", email);
        self.state.send_replace(SessionState::Authenticated {
            email: email.to_string(),
        });
        Ok(())
    }

    /// Server rejected the token: clear credentials and enter `Expired`
    pub fn expire(&self) {
        self.clear_credentials();
        tracing::warn!(
            "Admin session expired; sign in again at {}",
            LOGIN_ROUTE
        );
        self.state.send_replace(SessionState::Expired);
    }

    /// Clear credentials and enter `Anonymous`
    pub fn logout(&self) {
        self.clear_credentials();
        tracing::info!("Admin session closed");
        self.state.send_replace(SessionState::Anonymous);
    }

    fn clear_credentials(&self) {
        for key in [TOKEN_KEY, EMAIL_KEY] {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!("Failed to clear {} from credential store: {}", key, e);
            }
        }
    }
}
