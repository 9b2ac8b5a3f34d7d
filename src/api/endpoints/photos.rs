//! Photo moderation

use futures::future::join_all;
use serde_json::json;

use crate::api::client::{AdminApiClient, RequestSpec};
use crate::api::error::ApiError;
use crate::api::models::{ModerationQueue, PhotoAction, PhotoDecision, PhotoStatus, ProfilePhoto};
use crate::api::transport::Transport;
use crate::api::url::QueryString;

impl<T> AdminApiClient<T>
where
    T: Transport,
{
    /// Photos, optionally filtered by moderation status
    pub async fn get_photos(
        &self,
        status: Option<PhotoStatus>,
    ) -> Result<Vec<ProfilePhoto>, ApiError> {
        let path = QueryString::new()
            .push_opt("status", status)
            .apply("/admin/photos");
        self.execute(RequestSpec::get(path)).await
    }

    /// Approved photos belonging to `uid`
    pub async fn get_user_photos(&self, uid: &str) -> Result<Vec<ProfilePhoto>, ApiError> {
        let photos = self.get_photos(Some(PhotoStatus::Approved)).await?;
        Ok(photos.into_iter().filter(|p| p.user_id == uid).collect())
    }

    /// Look a photo up in the unfiltered listing
    pub async fn get_photo(&self, photo_id: &str) -> Result<ProfilePhoto, ApiError> {
        self.get_photos(None)
            .await?
            .into_iter()
            .find(|p| p.id == photo_id)
            .ok_or_else(|| ApiError::NotFound("Photo not found".to_string()))
    }

    pub async fn approve_photo(
        &self,
        photo_id: &str,
        reason: Option<&str>,
        confidence: Option<f64>,
    ) -> Result<ProfilePhoto, ApiError> {
        self.decide_photo(photo_id, "approve", reason, confidence)
            .await
    }

    pub async fn reject_photo(
        &self,
        photo_id: &str,
        reason: Option<&str>,
        confidence: Option<f64>,
    ) -> Result<ProfilePhoto, ApiError> {
        self.decide_photo(photo_id, "reject", reason, confidence)
            .await
    }

    async fn decide_photo(
        &self,
        photo_id: &str,
        verb: &str,
        reason: Option<&str>,
        confidence: Option<f64>,
    ) -> Result<ProfilePhoto, ApiError> {
        let decision = PhotoDecision { reason, confidence };
        self.execute(
            RequestSpec::post(format!("/admin/photos/{}/{}", photo_id, verb))
                .with_body(json!(decision)),
        )
        .await
    }

    pub async fn requeue_photo(
        &self,
        photo_id: &str,
        queue: ModerationQueue,
    ) -> Result<ProfilePhoto, ApiError> {
        self.execute(
            RequestSpec::post(format!("/admin/photos/{}/requeue", photo_id))
                .with_body(json!({ "queue": queue })),
        )
        .await
    }

    pub async fn bulk_photo_action(
        &self,
        photo_ids: &[String],
        action: PhotoAction,
    ) -> Result<(), ApiError> {
        tracing::info!("Bulk {} of {} photos", action, photo_ids.len());
        self.execute_unit(
            RequestSpec::post("/admin/photos/bulk")
                .with_body(json!({ "photoIds": photo_ids, "action": action })),
        )
        .await
    }

    /// Delete photos concurrently; the first failure is returned after all
    /// requests have completed
    pub async fn bulk_delete_photos(&self, photo_ids: &[String]) -> Result<(), ApiError> {
        let results = join_all(photo_ids.iter().map(|id| self.delete_photo(id))).await;
        results.into_iter().collect()
    }

    pub async fn delete_photo(&self, photo_id: &str) -> Result<(), ApiError> {
        self.execute_unit(RequestSpec::delete(format!("/admin/photos/{}", photo_id)))
            .await
    }
}
