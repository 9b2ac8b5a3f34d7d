//! Content reports

use serde_json::{json, Map, Value};

use crate::api::client::{AdminApiClient, RequestSpec};
use crate::api::error::ApiError;
use crate::api::models::{ContentReport, ReportAction, ReportStatus, ReportUpdate};
use crate::api::transport::Transport;
use crate::api::url::QueryString;

impl<T> AdminApiClient<T>
where
    T: Transport,
{
    pub async fn get_reports(
        &self,
        status: Option<ReportStatus>,
    ) -> Result<Vec<ContentReport>, ApiError> {
        let path = QueryString::new()
            .push_opt("status", status)
            .apply("/admin/reports");
        self.execute(RequestSpec::get(path)).await
    }

    pub async fn get_report(&self, id: &str) -> Result<ContentReport, ApiError> {
        self.execute(RequestSpec::get(format!("/admin/reports/{}", id)))
            .await
    }

    pub async fn update_report(
        &self,
        id: &str,
        update: &ReportUpdate,
    ) -> Result<ContentReport, ApiError> {
        self.execute(RequestSpec::patch(format!("/admin/reports/{}", id)).with_body(json!(update)))
            .await
    }

    /// Close a report with a sanction
    pub async fn resolve_report(
        &self,
        id: &str,
        action: ReportAction,
        notes: Option<&str>,
    ) -> Result<ContentReport, ApiError> {
        let mut body = Map::new();
        body.insert("action".to_string(), json!(action));
        if let Some(notes) = notes {
            body.insert("notes".to_string(), Value::from(notes));
        }

        tracing::info!("Resolving report {} with {}", id, action);
        self.execute(
            RequestSpec::post(format!("/admin/reports/{}/resolve", id))
                .with_body(Value::Object(body)),
        )
        .await
    }
}
