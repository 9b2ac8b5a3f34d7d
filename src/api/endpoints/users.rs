//! User directory, impersonation and account actions

use futures::future::join_all;
use serde_json::json;

use crate::api::client::{AdminApiClient, RequestSpec};
use crate::api::error::ApiError;
use crate::api::models::{
    ActionAck, AdminUser, ImpersonationToken, UserFlags, UserFlagsPatch, UserProfile, UserStats,
    UserSummary,
};
use crate::api::transport::Transport;
use crate::api::url::QueryString;

impl<T> AdminApiClient<T>
where
    T: Transport,
{
    pub async fn get_user_stats(&self) -> Result<UserStats, ApiError> {
        self.execute(RequestSpec::get("/admin/users/stats")).await
    }

    /// Name search, each row hydrated with the full user record
    ///
    /// Rows whose details cannot be fetched are returned as placeholders.
    /// Authentication errors abort the whole listing.
    pub async fn get_users(&self, name: Option<&str>) -> Result<Vec<AdminUser>, ApiError> {
        let path = QueryString::new()
            .push_opt("name", name.filter(|n| !n.is_empty()))
            .apply("/admin/users");
        let rows: Vec<UserSummary> = self.execute(RequestSpec::get(path)).await?;
        tracing::debug!("Hydrating {} user rows", rows.len());

        let hydrated = join_all(rows.into_iter().map(|row| async move {
            match self.get_user(&row.uid).await {
                Ok(mut details) => {
                    details.name = row.name.or(details.name);
                    details.email = row.email.or(details.email);
                    Ok(details)
                }
                Err(e) if e.is_auth() => Err(e),
                Err(e) => {
                    tracing::debug!("Falling back to summary for {}: {}", row.uid, e);
                    Ok(AdminUser::placeholder(&row.uid, row.email, row.name))
                }
            }
        }))
        .await;

        hydrated.into_iter().collect()
    }

    pub async fn get_user(&self, uid: &str) -> Result<AdminUser, ApiError> {
        self.execute(RequestSpec::get(format!("/admin/users/{}", uid)))
            .await
    }

    pub async fn get_user_flags(&self, uid: &str) -> Result<UserFlags, ApiError> {
        self.execute(RequestSpec::get(format!("/admin/users/{}/flags", uid)))
            .await
    }

    pub async fn update_user_flags(
        &self,
        uid: &str,
        flags: UserFlagsPatch,
    ) -> Result<UserFlags, ApiError> {
        self.execute(RequestSpec::patch(format!("/admin/users/{}/flags", uid)).with_body(json!(flags)))
            .await
    }

    pub async fn get_user_profile(&self, uid: &str) -> Result<UserProfile, ApiError> {
        self.execute(RequestSpec::get(format!("/admin/profiles/{}", uid)))
            .await
    }

    pub async fn impersonate_user(&self, uid: &str) -> Result<ImpersonationToken, ApiError> {
        tracing::info!("Requesting impersonation token for {}", uid);
        self.execute(RequestSpec::post(format!("/admin/users/{}/impersonate", uid)))
            .await
    }

    pub async fn pause_user(&self, uid: &str) -> Result<AdminUser, ApiError> {
        self.execute(RequestSpec::patch(format!("/admin/users/{}/pause", uid)))
            .await
    }

    pub async fn unpause_user(&self, uid: &str) -> Result<AdminUser, ApiError> {
        self.execute(RequestSpec::patch(format!("/admin/users/{}/unpause", uid)))
            .await
    }

    pub async fn delete_user(&self, uid: &str) -> Result<(), ApiError> {
        tracing::info!("Deleting user {}", uid);
        self.execute_unit(RequestSpec::delete(format!("/admin/users/{}", uid)))
            .await
    }

    pub async fn reset_review_timeout(&self, uid: &str) -> Result<(), ApiError> {
        self.execute_unit(RequestSpec::post(format!(
            "/admin/users/{}/reset-review-timeout",
            uid
        )))
        .await
    }

    pub async fn reset_strikes(&self, uid: &str) -> Result<(), ApiError> {
        self.execute_unit(RequestSpec::post(format!("/admin/users/{}/reset-strikes", uid)))
            .await
    }

    pub async fn revoke_sessions(&self, uid: &str) -> Result<(), ApiError> {
        self.execute_unit(RequestSpec::post(format!(
            "/admin/users/{}/revoke-sessions",
            uid
        )))
        .await
    }

    pub async fn update_user_role(&self, uid: &str, role: &str) -> Result<AdminUser, ApiError> {
        self.execute(
            RequestSpec::patch(format!("/admin/users/{}/role", uid)).with_body(json!({ "role": role })),
        )
        .await
    }

    /// Ban a user; an empty reason is sent as `null`
    pub async fn ban_user(&self, uid: &str, reason: Option<&str>) -> Result<ActionAck, ApiError> {
        let reason = reason.filter(|r| !r.is_empty());
        tracing::info!("Banning user {}", uid);
        self.execute(
            RequestSpec::post(format!("/admin/users/{}/ban", uid))
                .with_body(json!({ "reason": reason })),
        )
        .await
    }

    pub async fn unban_user(&self, uid: &str) -> Result<ActionAck, ApiError> {
        self.execute(RequestSpec::post(format!("/admin/users/{}/unban", uid)))
            .await
    }

    pub async fn resend_verification(&self, uid: &str) -> Result<(), ApiError> {
        self.execute_unit(RequestSpec::post(format!(
            "/admin/users/{}/resend-verification",
            uid
        )))
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::api::error::ApiError;
    use crate::api::testing::authenticated_client;
    use serde_json::json;

    fn user_body(uid: &str, name: &str) -> String {
        json!({
            "id": uid,
            "uid": uid,
            "email": format!("{}@example.com", uid),
            "name": name,
            "isSubscribed": false,
            "subscriptionExpiresAt": null
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_get_users_hydrates_rows() {
        let (client, _store) = authenticated_client();
        client.transport().push(
            200,
            r#"[{"uid":"u1","name":"Ana"},{"uid":"u2","email":"b@example.com","name":null}]"#,
        );
        client.transport().push(200, &user_body("u1", "Ana Maria"));
        client.transport().push(404, r#"{"message":"gone"}"#);

        let users = client.get_users(Some("an a")).await.unwrap();

        assert_eq!(users.len(), 2);
        assert_eq!(users[0].name.as_deref(), Some("Ana"));
        assert_eq!(users[0].email.as_deref(), Some("u1@example.com"));
        assert_eq!(users[1].uid, "u2");
        assert_eq!(users[1].email.as_deref(), Some("b@example.com"));
        assert!(!users[1].is_subscribed);

        let urls = client.transport().urls();
        assert_eq!(urls[0], "https://api.test/api/admin/users?name=an+a");
        assert_eq!(urls[1], "https://api.test/api/admin/users/u1");
        assert_eq!(urls[2], "https://api.test/api/admin/users/u2");
    }

    #[tokio::test]
    async fn test_get_users_propagates_auth_failure() {
        let (client, _store) = authenticated_client();
        client.transport().push(200, r#"[{"uid":"u1"}]"#);
        client.transport().push(401, "");

        let result = client.get_users(None).await;
        assert!(matches!(result, Err(ApiError::AuthenticationExpired)));
        assert_eq!(
            client.transport().urls()[0],
            "https://api.test/api/admin/users"
        );
    }

    #[tokio::test]
    async fn test_ban_user_body() {
        let (client, _store) = authenticated_client();
        client
            .transport()
            .push(200, r#"{"success":true,"message":"banned"}"#);
        client
            .transport()
            .push(200, r#"{"success":true,"message":"banned"}"#);

        let ack = client.ban_user("u1", Some("spam")).await.unwrap();
        assert!(ack.success);
        client.ban_user("u1", Some("")).await.unwrap();

        let requests = client.transport().requests();
        assert_eq!(requests[0].method, reqwest::Method::POST);
        assert_eq!(requests[0].url, "https://api.test/api/admin/users/u1/ban");
        assert_eq!(requests[0].body, Some(json!({"reason": "spam"})));
        assert_eq!(requests[1].body, Some(json!({"reason": null})));
    }

    #[tokio::test]
    async fn test_update_user_flags_sends_only_changed_fields() {
        let (client, _store) = authenticated_client();
        client.transport().push(
            200,
            r#"{"unlimitedSearch":true,"unlimitedUndo":false,"unlimitedMessageReq":false}"#,
        );

        let patch = crate::api::models::UserFlagsPatch {
            unlimited_search: Some(true),
            ..Default::default()
        };
        let flags = client.update_user_flags("u1", patch).await.unwrap();

        assert!(flags.unlimited_search);
        let request = &client.transport().requests()[0];
        assert_eq!(request.method, reqwest::Method::PATCH);
        assert_eq!(request.body, Some(json!({"unlimitedSearch": true})));
    }

    #[tokio::test]
    async fn test_account_action_paths() {
        let (client, _store) = authenticated_client();
        for _ in 0..4 {
            client.transport().push(204, "");
        }

        client.delete_user("u9").await.unwrap();
        client.reset_review_timeout("u9").await.unwrap();
        client.revoke_sessions("u9").await.unwrap();
        client.resend_verification("u9").await.unwrap();

        let requests = client.transport().requests();
        assert_eq!(requests[0].method, reqwest::Method::DELETE);
        assert_eq!(
            client.transport().urls()[1..],
            [
                "https://api.test/api/admin/users/u9/reset-review-timeout",
                "https://api.test/api/admin/users/u9/revoke-sessions",
                "https://api.test/api/admin/users/u9/resend-verification",
            ]
        );
    }
}
