//! Feature flags and payment switches
//!
//! The server stores flag values in whatever shape they were written
//! (bool, number, string or `{enabled, rolloutPercent}`); listings normalize
//! them through [`FeatureFlag::from_raw`].

use serde_json::{json, Map, Value};

use crate::api::client::{AdminApiClient, RequestSpec};
use crate::api::error::ApiError;
use crate::api::models::{FeatureFlag, PaymentFlags};
use crate::api::transport::Transport;

impl<T> AdminApiClient<T>
where
    T: Transport,
{
    pub async fn get_feature_flags(&self) -> Result<Vec<FeatureFlag>, ApiError> {
        let raw: Map<String, Value> = self.execute(RequestSpec::get("/admin/flags")).await?;
        Ok(raw
            .iter()
            .map(|(key, value)| FeatureFlag::from_raw(key, value))
            .collect())
    }

    /// Write a flag and read it back
    ///
    /// Without a rollout percentage the flag is stored as a bare boolean.
    pub async fn update_feature_flag(
        &self,
        key: &str,
        enabled: bool,
        rollout_percent: Option<f64>,
    ) -> Result<FeatureFlag, ApiError> {
        let value = match rollout_percent {
            Some(percent) => json!({ "enabled": enabled, "rolloutPercent": percent }),
            None => json!(enabled),
        };
        tracing::info!("Setting flag {} to {}", key, value);

        self.execute_unit(
            RequestSpec::patch(format!("/admin/flags/{}", key)).with_body(json!({ "value": value })),
        )
        .await?;

        let flags = self.get_feature_flags().await?;
        Ok(flags
            .into_iter()
            .find(|flag| flag.key == key)
            .unwrap_or_else(|| FeatureFlag {
                key: key.to_string(),
                enabled,
                rollout_percent,
            }))
    }

    /// Payment switches; a flag that was never written counts as enabled
    pub async fn get_payment_flags(&self) -> Result<PaymentFlags, ApiError> {
        let flags = self.get_feature_flags().await?;
        let lookup = |key: &str| {
            flags
                .iter()
                .find(|flag| flag.key == key)
                .map(|flag| flag.enabled)
                .unwrap_or(true)
        };

        Ok(PaymentFlags {
            enable_payments: lookup("enablePayments"),
            enable_search_tokens: lookup("enableSearchTokens"),
            enable_undo_tokens: lookup("enableUndoTokens"),
            enable_message_req_tokens: lookup("enableMessageReqTokens"),
        })
    }

    /// Write each payment switch in turn; stops at the first failure
    pub async fn update_payment_flags(
        &self,
        flags: PaymentFlags,
    ) -> Result<PaymentFlags, ApiError> {
        for (key, value) in flags.entries() {
            self.update_feature_flag(key, value, None).await?;
        }
        Ok(flags)
    }
}

#[cfg(test)]
mod tests {
    use crate::api::models::PaymentFlags;
    use crate::api::testing::authenticated_client;
    use serde_json::json;

    #[tokio::test]
    async fn test_flag_listing_normalized() {
        let (client, _store) = authenticated_client();
        client.transport().push(
            200,
            r#"{"beta":{"enabled":true,"rolloutPercent":10},"legacy":"true","ratio":0}"#,
        );

        let flags = client.get_feature_flags().await.unwrap();
        let beta = flags.iter().find(|f| f.key == "beta").unwrap();
        assert!(beta.enabled);
        assert_eq!(beta.rollout_percent, Some(10.0));
        assert!(flags.iter().find(|f| f.key == "legacy").unwrap().enabled);
        assert!(!flags.iter().find(|f| f.key == "ratio").unwrap().enabled);
    }

    #[tokio::test]
    async fn test_update_flag_reads_back() {
        let (client, _store) = authenticated_client();
        client.transport().push(200, r#"{"beta":true}"#);
        client.transport().push(200, r#"{"beta":true}"#);

        let flag = client.update_feature_flag("beta", true, None).await.unwrap();
        assert!(flag.enabled);

        let requests = client.transport().requests();
        assert_eq!(requests[0].url, "https://api.test/api/admin/flags/beta");
        assert_eq!(requests[0].body, Some(json!({"value": true})));
        assert_eq!(requests[1].url, "https://api.test/api/admin/flags");
    }

    #[tokio::test]
    async fn test_update_flag_missing_after_write() {
        let (client, _store) = authenticated_client();
        client.transport().push(200, "{}");
        client.transport().push(200, "{}");

        let flag = client
            .update_feature_flag("ramp", true, Some(50.0))
            .await
            .unwrap();
        assert_eq!(flag.rollout_percent, Some(50.0));
        assert_eq!(
            client.transport().requests()[0].body,
            Some(json!({"value": {"enabled": true, "rolloutPercent": 50.0}}))
        );
    }

    #[tokio::test]
    async fn test_payment_flags_default_enabled() {
        let (client, _store) = authenticated_client();
        client
            .transport()
            .push(200, r#"{"enablePayments":false}"#);

        let flags = client.get_payment_flags().await.unwrap();
        assert_eq!(
            flags,
            PaymentFlags {
                enable_payments: false,
                enable_search_tokens: true,
                enable_undo_tokens: true,
                enable_message_req_tokens: true,
            }
        );
    }

    #[tokio::test]
    async fn test_update_payment_flags_sequence() {
        let (client, _store) = authenticated_client();
        for _ in 0..4 {
            client.transport().push(200, "{}");
            client.transport().push(200, "{}");
        }

        let flags = PaymentFlags {
            enable_payments: true,
            enable_search_tokens: false,
            enable_undo_tokens: true,
            enable_message_req_tokens: false,
        };
        client.update_payment_flags(flags).await.unwrap();

        let patched: Vec<String> = client
            .transport()
            .requests()
            .into_iter()
            .filter(|r| r.method == reqwest::Method::PATCH)
            .map(|r| r.url)
            .collect();
        assert_eq!(
            patched,
            vec![
                "https://api.test/api/admin/flags/enablePayments",
                "https://api.test/api/admin/flags/enableSearchTokens",
                "https://api.test/api/admin/flags/enableUndoTokens",
                "https://api.test/api/admin/flags/enableMessageReqTokens",
            ]
        );
    }
}
