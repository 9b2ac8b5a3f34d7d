//! Tokens and subscriptions

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::api::client::{AdminApiClient, RequestSpec};
use crate::api::error::ApiError;
use crate::api::models::{AdminUser, SubscriptionUpdate, TokenBalances, TokenDelta};
use crate::api::transport::Transport;

impl<T> AdminApiClient<T>
where
    T: Transport,
{
    pub async fn get_user_tokens(&self, uid: &str) -> Result<TokenBalances, ApiError> {
        self.execute(RequestSpec::get(format!("/admin/users/{}/tokens", uid)))
            .await
    }

    pub async fn grant_tokens(&self, uid: &str, tokens: TokenDelta) -> Result<(), ApiError> {
        tracing::info!("Granting tokens to {}: {:?}", uid, tokens);
        let result = self
            .execute_unit(
                RequestSpec::post(format!("/admin/users/{}/tokens/grant", uid))
                    .with_body(json!(tokens)),
            )
            .await;

        match &result {
            Ok(()) => tracing::info!("Tokens granted to {}", uid),
            Err(e) => tracing::error!("Failed to grant tokens to {}: {}", uid, e),
        }
        result
    }

    pub async fn revoke_tokens(&self, uid: &str, tokens: TokenDelta) -> Result<(), ApiError> {
        tracing::info!("Revoking tokens from {}: {:?}", uid, tokens);
        self.execute_unit(
            RequestSpec::post(format!("/admin/users/{}/tokens/revoke", uid))
                .with_body(json!(tokens)),
        )
        .await
    }

    pub async fn update_subscription(
        &self,
        uid: &str,
        is_subscribed: bool,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<AdminUser, ApiError> {
        let update = SubscriptionUpdate {
            is_subscribed,
            subscription_expires_at: expires_at,
        };
        self.execute(
            RequestSpec::patch(format!("/admin/users/{}/subscription", uid))
                .with_body(json!(update)),
        )
        .await
    }
}
