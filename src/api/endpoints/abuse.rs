//! Server-side rate-limit buckets, IP lists and discovery queues

use chrono::Utc;
use serde_json::{json, Value};

use crate::api::client::{AdminApiClient, RequestSpec};
use crate::api::error::ApiError;
use crate::api::models::{BucketKind, BucketList, QueueInfo, RateLimitBucket, RawQueue};
use crate::api::transport::Transport;

impl<T> AdminApiClient<T>
where
    T: Transport,
{
    /// Active bucket keys
    ///
    /// The server only reports keys; counts and limits are zero and the
    /// reset time is the time of the call.
    pub async fn get_rate_limit_buckets(&self) -> Result<Vec<RateLimitBucket>, ApiError> {
        let list: BucketList = self
            .execute(RequestSpec::get("/admin/rate-limit/buckets"))
            .await?;
        let now = Utc::now();

        Ok(list
            .buckets
            .unwrap_or_default()
            .into_iter()
            .map(|key| RateLimitBucket {
                kind: if key.contains("user") {
                    BucketKind::User
                } else {
                    BucketKind::Ip
                },
                key,
                count: 0,
                limit: 0,
                reset_at: now,
            })
            .collect())
    }

    pub async fn clear_rate_limit_bucket(&self, key: &str) -> Result<(), ApiError> {
        tracing::info!("Clearing rate-limit bucket {}", key);
        self.execute_unit(RequestSpec::delete(format!(
            "/admin/rate-limit/buckets/{}",
            key
        )))
        .await
    }

    pub async fn whitelist_ip(&self, ip: &str) -> Result<(), ApiError> {
        self.execute_unit(
            RequestSpec::post("/admin/rate-limit/whitelist").with_body(json!({ "ip": ip })),
        )
        .await
    }

    pub async fn blacklist_ip(&self, ip: &str) -> Result<(), ApiError> {
        self.execute_unit(
            RequestSpec::post("/admin/rate-limit/blacklist").with_body(json!({ "ip": ip })),
        )
        .await
    }

    /// Cached discovery candidates for `uid`
    pub async fn get_queue(&self, uid: &str) -> Result<QueueInfo, ApiError> {
        let raw: RawQueue = self
            .execute(RequestSpec::get(format!("/admin/queue/{}", uid)))
            .await?;

        let candidates = match raw.cached {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        Ok(QueueInfo {
            uid: raw.uid.unwrap_or_else(|| uid.to_string()),
            candidates,
            filters: None,
        })
    }

    pub async fn rebuild_queue(&self, uid: &str) -> Result<QueueInfo, ApiError> {
        self.execute_unit(RequestSpec::post(format!("/admin/queue/{}/rebuild", uid)))
            .await?;
        Ok(QueueInfo {
            uid: uid.to_string(),
            candidates: Vec::new(),
            filters: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::BucketKind;
    use crate::api::testing::authenticated_client;
    use serde_json::json;

    #[tokio::test]
    async fn test_bucket_kind_from_key() {
        let (client, _store) = authenticated_client();
        client
            .transport()
            .push(200, r#"{"buckets":["rl:user:u1","rl:ip:10.0.0.1"]}"#);
        client.transport().push(200, "{}");

        let buckets = client.get_rate_limit_buckets().await.unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].kind, BucketKind::User);
        assert_eq!(buckets[1].kind, BucketKind::Ip);
        assert_eq!(buckets[1].limit, 0);

        assert!(client.get_rate_limit_buckets().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_queue_shapes() {
        let (client, _store) = authenticated_client();
        client
            .transport()
            .push(200, r#"{"uid":"u1","cached":[{"uid":"c1"}]}"#);
        client.transport().push(200, r#"{"cached":"stale"}"#);

        let queue = client.get_queue("u1").await.unwrap();
        assert_eq!(queue.candidates, vec![json!({"uid": "c1"})]);
        assert!(queue.filters.is_none());

        let queue = client.get_queue("u2").await.unwrap();
        assert_eq!(queue.uid, "u2");
        assert!(queue.candidates.is_empty());
    }

    #[tokio::test]
    async fn test_ip_lists() {
        let (client, _store) = authenticated_client();
        client.transport().push(204, "");
        client.transport().push(204, "");

        client.whitelist_ip("10.0.0.1").await.unwrap();
        client.blacklist_ip("10.0.0.2").await.unwrap();

        let requests = client.transport().requests();
        assert_eq!(
            requests[0].url,
            "https://api.test/api/admin/rate-limit/whitelist"
        );
        assert_eq!(requests[1].body, Some(json!({"ip": "10.0.0.2"})));
    }
}
