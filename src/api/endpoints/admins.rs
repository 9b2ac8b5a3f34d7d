//! Console operator accounts

use serde_json::json;

use crate::api::client::{AdminApiClient, RequestSpec, ADMIN_CHECK_ENDPOINT};
use crate::api::error::ApiError;
use crate::api::models::Admin;
use crate::api::transport::Transport;

impl<T> AdminApiClient<T>
where
    T: Transport,
{
    pub async fn get_admins(&self) -> Result<Vec<Admin>, ApiError> {
        self.execute(RequestSpec::get(ADMIN_CHECK_ENDPOINT)).await
    }

    pub async fn create_admin(&self, email: &str, uid: &str) -> Result<Admin, ApiError> {
        tracing::info!("Granting admin access to {} ({})", email, uid);
        self.execute(
            RequestSpec::post(ADMIN_CHECK_ENDPOINT).with_body(json!({ "email": email, "uid": uid })),
        )
        .await
    }

    pub async fn delete_admin(&self, uid: &str) -> Result<(), ApiError> {
        tracing::info!("Revoking admin access from {}", uid);
        self.execute_unit(RequestSpec::delete(format!("/admin/admins/{}", uid)))
            .await
    }
}
