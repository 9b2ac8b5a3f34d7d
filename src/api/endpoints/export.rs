//! DSAR export jobs and the audit trail

use crate::api::client::{AdminApiClient, RequestSpec};
use crate::api::error::ApiError;
use crate::api::models::{AuditEvent, AuditQuery, ExportJob, ExportStatus};
use crate::api::transport::Transport;
use crate::api::url::QueryString;

impl<T> AdminApiClient<T>
where
    T: Transport,
{
    /// Start a data export for `uid`
    pub async fn export_user_data(&self, uid: &str) -> Result<ExportJob, ApiError> {
        tracing::info!("Starting data export for {}", uid);
        self.execute(RequestSpec::post(format!("/admin/users/{}/export", uid)))
            .await
    }

    pub async fn get_export_status(
        &self,
        uid: &str,
        job_id: &str,
    ) -> Result<ExportStatus, ApiError> {
        self.execute(RequestSpec::get(format!(
            "/admin/users/{}/export/{}",
            uid, job_id
        )))
        .await
    }

    pub async fn get_audit_logs(&self, query: &AuditQuery) -> Result<Vec<AuditEvent>, ApiError> {
        let path = QueryString::new()
            .push("limit", query.limit)
            .push("offset", query.offset)
            .push_opt("adminId", query.admin_id.as_deref().filter(|s| !s.is_empty()))
            .push_opt("action", query.action.as_deref().filter(|s| !s.is_empty()))
            .push_opt("since", query.since.as_deref().filter(|s| !s.is_empty()))
            .apply("/admin/audit");
        self.execute(RequestSpec::get(path)).await
    }
}
