//! System health, logs, jobs and notification tools

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::api::client::{AdminApiClient, RequestSpec};
use crate::api::error::ApiError;
use crate::api::models::{
    HealthStatus, JobCounts, ListOrWrapped, LogEntry, LogLevel, RawHealth, SystemHealth,
    TestEmail, TestPush,
};
use crate::api::transport::Transport;
use crate::api::url::QueryString;

/// Default number of log lines requested
pub const DEFAULT_LOG_LIMIT: u32 = 100;

impl<T> AdminApiClient<T>
where
    T: Transport,
{
    /// Backend health
    ///
    /// The health endpoint only reports `status` and `redis`; anything other
    /// than `"ok"` is shown as degraded.
    pub async fn get_system_health(&self) -> Result<SystemHealth, ApiError> {
        let raw: RawHealth = self.execute(RequestSpec::get("/admin/health")).await?;

        Ok(SystemHealth {
            status: if raw.status.as_deref() == Some("ok") {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded
            },
            redis: raw.redis.unwrap_or(false),
            s3: true,
            jobs: JobCounts::default(),
        })
    }

    pub async fn get_logs(
        &self,
        level: Option<LogLevel>,
        limit: u32,
    ) -> Result<Vec<LogEntry>, ApiError> {
        let endpoint = QueryString::new()
            .push_opt("level", level)
            .push("limit", limit)
            .apply("/admin/logs");
        let raw: ListOrWrapped<LogEntry> = self.execute(RequestSpec::get(endpoint.clone())).await?;
        unwrap_list(&endpoint, raw, "logs")
    }

    pub async fn get_jobs(&self) -> Result<Vec<Value>, ApiError> {
        let raw: ListOrWrapped<Value> = self.execute(RequestSpec::get("/admin/jobs")).await?;
        unwrap_list("/admin/jobs", raw, "jobs")
    }

    pub async fn send_test_push(&self, uid: &str, title: &str, body: &str) -> Result<(), ApiError> {
        self.execute_unit(
            RequestSpec::post(format!("/admin/users/{}/test-push", uid))
                .with_body(json!(TestPush { title, body })),
        )
        .await
    }

    pub async fn send_test_email(
        &self,
        uid: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), ApiError> {
        self.execute_unit(
            RequestSpec::post(format!("/admin/users/{}/test-email", uid))
                .with_body(json!(TestEmail { subject, body })),
        )
        .await
    }

    pub async fn get_push_log(&self, uid: &str) -> Result<Vec<Value>, ApiError> {
        self.execute(RequestSpec::get(format!("/admin/users/{}/push-log", uid)))
            .await
    }
}

// A bare array, or the array under `key`; a missing key is an empty list
fn unwrap_list<R>(endpoint: &str, raw: ListOrWrapped<R>, key: &str) -> Result<Vec<R>, ApiError>
where
    R: DeserializeOwned,
{
    match raw {
        ListOrWrapped::List(items) => Ok(items),
        ListOrWrapped::Wrapped(mut map) => match map.remove(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(items) => serde_json::from_value(items).map_err(|source| ApiError::Decode {
                endpoint: endpoint.to_string(),
                source,
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::{HealthStatus, LogLevel};
    use crate::api::testing::authenticated_client;
    use serde_json::json;

    #[tokio::test]
    async fn test_health_mapping() {
        let (client, _store) = authenticated_client();
        client.transport().push(200, r#"{"status":"ok","redis":true}"#);
        client.transport().push(200, r#"{"status":"redis-down"}"#);

        let health = client.get_system_health().await.unwrap();
        assert_eq!(health.status, HealthStatus::Healthy);
        assert!(health.redis);
        assert!(health.s3);
        assert_eq!(health.jobs.failed, 0);

        let health = client.get_system_health().await.unwrap();
        assert_eq!(health.status, HealthStatus::Degraded);
        assert!(!health.redis);
    }

    #[tokio::test]
    async fn test_logs_both_shapes() {
        let (client, _store) = authenticated_client();
        let entry = r#"{"id":"l1","level":"error","message":"boom","timestamp":"2025-01-01T00:00:00Z"}"#;
        client.transport().push(200, &format!("[{}]", entry));
        client
            .transport()
            .push(200, &format!(r#"{{"logs":[{}]}}"#, entry));
        client.transport().push(200, "{}");

        assert_eq!(client.get_logs(None, 100).await.unwrap().len(), 1);
        let logs = client.get_logs(Some(LogLevel::Error), 5).await.unwrap();
        assert_eq!(logs[0].level, LogLevel::Error);
        assert!(client.get_logs(None, 100).await.unwrap().is_empty());

        let urls = client.transport().urls();
        assert_eq!(urls[0], "https://api.test/api/admin/logs?limit=100");
        assert_eq!(urls[1], "https://api.test/api/admin/logs?level=error&limit=5");
    }

    #[tokio::test]
    async fn test_jobs_wrapped() {
        let (client, _store) = authenticated_client();
        client
            .transport()
            .push(200, r#"{"jobs":[{"name":"digest"}]}"#);

        let jobs = client.get_jobs().await.unwrap();
        assert_eq!(jobs, vec![json!({"name": "digest"})]);
    }

    #[tokio::test]
    async fn test_test_push_body() {
        let (client, _store) = authenticated_client();
        client.transport().push(204, "");

        client.send_test_push("u1", "Hi", "Ping").await.unwrap();
        assert_eq!(
            client.transport().requests()[0].body,
            Some(json!({"title": "Hi", "body": "Ping"}))
        );
    }
}
