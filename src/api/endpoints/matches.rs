//! Matches and chat oversight

use serde_json::{json, Value};

use crate::api::client::{AdminApiClient, RequestSpec};
use crate::api::error::ApiError;
use crate::api::models::Match;
use crate::api::transport::Transport;

impl<T> AdminApiClient<T>
where
    T: Transport,
{
    pub async fn get_user_matches(&self, uid: &str) -> Result<Vec<Match>, ApiError> {
        self.execute(RequestSpec::get(format!("/admin/users/{}/matches", uid)))
            .await
    }

    pub async fn unmatch(&self, match_id: &str) -> Result<(), ApiError> {
        self.execute_unit(RequestSpec::post(format!("/admin/matches/{}/unmatch", match_id)))
            .await
    }

    /// Raw chat messages of a match
    pub async fn get_match_messages(&self, match_id: &str) -> Result<Vec<Value>, ApiError> {
        self.execute(RequestSpec::get(format!("/admin/matches/{}/messages", match_id)))
            .await
    }

    pub async fn mute_user_chat(&self, uid: &str, duration_hours: u32) -> Result<(), ApiError> {
        self.execute_unit(
            RequestSpec::post(format!("/admin/users/{}/mute-chat", uid))
                .with_body(json!({ "durationHours": duration_hours })),
        )
        .await
    }

    pub async fn clear_message_request_tokens(&self, uid: &str) -> Result<(), ApiError> {
        self.execute_unit(RequestSpec::post(format!(
            "/admin/users/{}/clear-message-tokens",
            uid
        )))
        .await
    }
}
