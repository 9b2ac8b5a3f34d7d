//! Two-phase compatibility operations
//!
//! `grant` and `search_users` each sequence more than one REST call. Neither
//! is atomic and nothing is rolled back: the outcome records what happened
//! in every phase so the caller can tell a partial grant from a full one.
//!
//! ```text
//! grant:        tokens ──► subscription ──► refresh
//!               (each phase Skipped | Succeeded | Failed; stop at first failure)
//!
//! search_users: [len > 20] uid lookup ──hit──► done
//!                                    └─miss─► name search
//! ```

use serde::Serialize;

use super::client::AdminApiClient;
use super::error::ApiError;
use super::models::{AdminUser, GrantRequest};
use super::transport::Transport;

/// Queries longer than this are first tried as a UID
pub const UID_LOOKUP_MIN_LEN: usize = 20;

/// Result of one phase of a multi-step operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "error", rename_all = "snake_case")]
pub enum PhaseStatus {
    /// Nothing to do for this phase
    Skipped,
    Succeeded,
    Failed(String),
}

impl PhaseStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, PhaseStatus::Failed(_))
    }
}

/// Per-phase report of [`AdminApiClient::grant`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrantOutcome {
    pub tokens: PhaseStatus,
    pub subscription: PhaseStatus,
    pub refresh: PhaseStatus,
    /// Refreshed user record, when the refresh phase succeeded
    pub user: Option<AdminUser>,
}

impl GrantOutcome {
    /// Every attempted phase succeeded
    pub fn is_complete(&self) -> bool {
        !self.tokens.is_failed() && !self.subscription.is_failed() && !self.refresh.is_failed()
    }

    /// Some phase succeeded and a later one failed
    pub fn is_partial(&self) -> bool {
        let phases = [&self.tokens, &self.subscription, &self.refresh];
        phases.iter().any(|p| **p == PhaseStatus::Succeeded) && !self.is_complete()
    }
}

/// Report of [`AdminApiClient::search_users`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSearchOutcome {
    pub uid_lookup: PhaseStatus,
    pub name_search: PhaseStatus,
    pub users: Vec<AdminUser>,
}

impl<T> AdminApiClient<T>
where
    T: Transport,
{
    /// Grant tokens and/or change the subscription, then re-read the user
    ///
    /// Phases without input are skipped. Authentication errors are returned
    /// as errors; every other failure is recorded and ends the sequence.
    pub async fn grant(&self, request: &GrantRequest) -> Result<GrantOutcome, ApiError> {
        let uid = request.user_uid.as_str();
        let mut outcome = GrantOutcome {
            tokens: PhaseStatus::Skipped,
            subscription: PhaseStatus::Skipped,
            refresh: PhaseStatus::Skipped,
            user: None,
        };

        if !request.tokens.is_empty() {
            outcome.tokens = phase(self.grant_tokens(uid, request.tokens).await)?;
            if outcome.tokens.is_failed() {
                return Ok(outcome);
            }
        }

        if request.touches_subscription() {
            let result = self
                .update_subscription(
                    uid,
                    request.is_subscribed.unwrap_or(false),
                    request.subscription_expires_at,
                )
                .await;
            outcome.subscription = phase(result.map(|_| ()))?;
            if outcome.subscription.is_failed() {
                tracing::warn!(
                    "Grant for {} partially applied: tokens {:?}, subscription failed",
                    uid,
                    outcome.tokens
                );
                return Ok(outcome);
            }
        }

        match self.get_user(uid).await {
            Ok(user) => {
                outcome.refresh = PhaseStatus::Succeeded;
                outcome.user = Some(user);
            }
            Err(e) if e.is_auth() => return Err(e),
            Err(e) => outcome.refresh = PhaseStatus::Failed(e.to_string()),
        }

        Ok(outcome)
    }

    /// Find users by UID or name
    ///
    /// Long queries are tried as a UID first; any non-auth failure of that
    /// lookup falls back to a name search.
    pub async fn search_users(&self, query: &str) -> Result<UserSearchOutcome, ApiError> {
        let mut uid_lookup = PhaseStatus::Skipped;

        if query.chars().count() > UID_LOOKUP_MIN_LEN {
            match self.get_user(query).await {
                Ok(user) => {
                    return Ok(UserSearchOutcome {
                        uid_lookup: PhaseStatus::Succeeded,
                        name_search: PhaseStatus::Skipped,
                        users: vec![user],
                    })
                }
                Err(e) if e.is_auth() => return Err(e),
                Err(e) => {
                    tracing::debug!("UID lookup for {:?} failed, searching by name: {}", query, e);
                    uid_lookup = PhaseStatus::Failed(e.to_string());
                }
            }
        }

        let users = self.get_users(Some(query)).await?;
        Ok(UserSearchOutcome {
            uid_lookup,
            name_search: PhaseStatus::Succeeded,
            users,
        })
    }
}

fn phase(result: Result<(), ApiError>) -> Result<PhaseStatus, ApiError> {
    match result {
        Ok(()) => Ok(PhaseStatus::Succeeded),
        Err(e) if e.is_auth() => Err(e),
        Err(e) => Ok(PhaseStatus::Failed(e.to_string())),
    }
}
