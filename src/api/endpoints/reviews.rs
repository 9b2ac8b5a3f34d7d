//! Reviews and strikes
//!
//! The rating and per-user review listings are display helpers: any failure
//! other than an authentication error degrades to "no data".

use serde_json::json;

use crate::api::client::{AdminApiClient, RequestSpec};
use crate::api::error::ApiError;
use crate::api::models::{RatingSummary, Review, StrikeCount};
use crate::api::transport::Transport;
use crate::api::url::QueryString;

impl<T> AdminApiClient<T>
where
    T: Transport,
{
    pub async fn get_reviews(
        &self,
        target_uid: Option<&str>,
        reviewer_uid: Option<&str>,
    ) -> Result<Vec<Review>, ApiError> {
        let path = QueryString::new()
            .push_opt("targetUid", target_uid.filter(|s| !s.is_empty()))
            .push_opt("reviewerUid", reviewer_uid.filter(|s| !s.is_empty()))
            .apply("/admin/reviews");
        self.execute(RequestSpec::get(path)).await
    }

    pub async fn update_review(&self, id: &str, approved: bool) -> Result<Review, ApiError> {
        self.execute(
            RequestSpec::patch(format!("/admin/reviews/{}", id))
                .with_body(json!({ "approved": approved })),
        )
        .await
    }

    pub async fn issue_strike(&self, review_id: &str) -> Result<Review, ApiError> {
        self.execute(RequestSpec::post(format!("/admin/reviews/{}/strike", review_id)))
            .await
    }

    pub async fn remove_strike(&self, review_id: &str) -> Result<Review, ApiError> {
        self.execute(RequestSpec::delete(format!(
            "/admin/reviews/{}/strike",
            review_id
        )))
        .await
    }

    pub async fn unblock_review_timeout(&self, uid: &str) -> Result<(), ApiError> {
        self.execute_unit(RequestSpec::post(format!(
            "/admin/users/{}/unblock-review-timeout",
            uid
        )))
        .await
    }

    /// Average rating, or `None` when unavailable
    pub async fn get_user_rating(&self, uid: &str) -> Result<Option<f64>, ApiError> {
        let result: Result<RatingSummary, ApiError> = self
            .execute(RequestSpec::get(format!("/admin/reviews/user/{}/average", uid)))
            .await;
        degrade(result, RatingSummary::default()).map(|summary| summary.value())
    }

    pub async fn get_user_strikes(&self, uid: &str) -> Result<u32, ApiError> {
        let count: StrikeCount = self
            .execute(RequestSpec::get(format!("/admin/users/{}/strikes", uid)))
            .await?;
        Ok(count.strike_count)
    }

    pub async fn get_received_reviews(&self, uid: &str) -> Result<Vec<Review>, ApiError> {
        let result = self
            .execute(RequestSpec::get(format!("/admin/reviews/user/{}", uid)))
            .await;
        degrade(result, Vec::new())
    }

    pub async fn get_sent_reviews(&self, uid: &str) -> Result<Vec<Review>, ApiError> {
        let result = self
            .execute(RequestSpec::get(format!("/admin/reviews/sent/{}", uid)))
            .await;
        degrade(result, Vec::new())
    }
}

fn degrade<R>(result: Result<R, ApiError>, fallback: R) -> Result<R, ApiError> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_auth() => Err(e),
        Err(e) => {
            tracing::debug!("Review lookup degraded: {}", e);
            Ok(fallback)
        }
    }
}
