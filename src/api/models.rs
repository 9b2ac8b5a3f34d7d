//! Admin API Schemas
//!
//! Request and response bodies exchanged with the admin REST API. Responses
//! are decoded into these types at the boundary; a body that does not match
//! fails with [`ApiError::Decode`](super::ApiError::Decode) instead of
//! propagating an unchecked shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Declares a lowercase string enum with an `as_str` accessor
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum!(
    /// Moderation state of a profile photo
    PhotoStatus { Pending => "pending", Approved => "approved", Rejected => "rejected", Flagged => "flagged" }
);

wire_enum!(
    /// Queue a photo can be sent back to
    ModerationQueue { Vision => "vision", Human => "human" }
);

wire_enum!(
    /// Bulk photo decision
    PhotoAction { Approve => "approve", Reject => "reject" }
);

wire_enum!(
    /// Lifecycle of a content report
    ReportStatus { Open => "open", Triaged => "triaged", Closed => "closed" }
);

wire_enum!(
    /// Sanction applied when resolving a report
    ReportAction { Warn => "warn", Suspend => "suspend", Delete => "delete" }
);

wire_enum!(
    /// Server log severity
    LogLevel { Error => "error", Warn => "warn", Info => "info" }
);

wire_enum!(
    /// Kind of rate-limit bucket on the server
    BucketKind { Ip => "ip", User => "user" }
);

wire_enum!(
    /// Overall backend health
    HealthStatus { Healthy => "healthy", Degraded => "degraded", Down => "down" }
);

wire_enum!(
    /// DSAR export job state
    ExportState { Pending => "pending", Completed => "completed", Failed => "failed" }
);

// ---------------------------------------------------------------------------
// Auth & admins
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Console operator account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: i64,
    pub uid: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub created_by_uid: Option<String>,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Per-user entitlement overrides
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFlags {
    pub unlimited_search: bool,
    pub unlimited_undo: bool,
    pub unlimited_message_req: bool,
}

/// Partial update of [`UserFlags`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFlagsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlimited_search: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlimited_undo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlimited_message_req: Option<bool>,
}

/// User record as seen by the console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: String,
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_subscribed: bool,
    #[serde(default)]
    pub subscription_expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub search_tokens: Option<u32>,
    #[serde(default)]
    pub message_tokens: Option<u32>,
    #[serde(default)]
    pub undo_tokens: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub banned: Option<bool>,
    #[serde(default)]
    pub banned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ban_reason: Option<String>,
    #[serde(default)]
    pub user_flags: Option<UserFlags>,
}

impl AdminUser {
    /// Minimal record used when a user's details cannot be fetched
    pub fn placeholder(uid: &str, email: Option<String>, name: Option<String>) -> Self {
        Self {
            id: uid.to_string(),
            uid: uid.to_string(),
            email,
            name,
            is_subscribed: false,
            subscription_expires_at: None,
            search_tokens: None,
            message_tokens: None,
            undo_tokens: None,
            created_at: None,
            banned: None,
            banned_at: None,
            ban_reason: None,
            user_flags: None,
        }
    }
}

/// Row of the `/admin/users` name search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub total_users: u64,
    pub active_users: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfilePhotoRef {
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Public dating profile of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub sex_preference: Option<String>,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    #[serde(default)]
    pub photos: Vec<ProfilePhotoRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpersonationToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// `{success, message}` acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionAck {
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Photos
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePhoto {
    pub id: String,
    pub user_id: String,
    pub url: String,
    pub status: PhotoStatus,
    #[serde(default)]
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoDecision<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportEvidence {
    #[serde(default)]
    pub messages: Option<Vec<Value>>,
    #[serde(default)]
    pub profile: Option<Value>,
    #[serde(default)]
    pub photos: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentReport {
    pub id: String,
    pub reporter_uid: String,
    pub target_uid: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: ReportStatus,
    #[serde(default)]
    pub evidence: Option<ReportEvidence>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Partial update of a report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReportStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Reviews & strikes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    pub reviewer_uid: String,
    pub target_uid: String,
    pub rating: f64,
    pub approved: bool,
    pub strike_issued: bool,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    #[serde(default)]
    pub average: Option<f64>,
    #[serde(default)]
    pub rating: Option<f64>,
}

impl RatingSummary {
    /// First non-zero of `average` / `rating`
    pub fn value(&self) -> Option<f64> {
        self.average
            .filter(|v| *v != 0.0)
            .or(self.rating.filter(|v| *v != 0.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrikeCount {
    pub strike_count: u32,
}

// ---------------------------------------------------------------------------
// Matches & chat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub user1_uid: String,
    pub user2_uid: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub unmatched_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Abuse controls & discovery
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitBucket {
    pub key: String,
    #[serde(rename = "type")]
    pub kind: BucketKind,
    pub count: u32,
    pub limit: u32,
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct BucketList {
    #[serde(default)]
    pub buckets: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueInfo {
    pub uid: String,
    pub candidates: Vec<Value>,
    pub filters: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawQueue {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub cached: Option<Value>,
}

// ---------------------------------------------------------------------------
// Tokens & entitlements
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalances {
    pub search_tokens: u32,
    pub message_tokens: u32,
    pub undo_tokens: u32,
}

/// Token amounts to grant or revoke; absent kinds are left untouched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDelta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub undo: Option<u32>,
}

impl TokenDelta {
    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.message.is_none() && self.undo.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionUpdate {
    pub is_subscribed: bool,
    pub subscription_expires_at: Option<DateTime<Utc>>,
}

/// Combined token + subscription grant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GrantRequest {
    pub user_uid: String,
    pub tokens: TokenDelta,
    pub is_subscribed: Option<bool>,
    pub subscription_expires_at: Option<DateTime<Utc>>,
}

impl GrantRequest {
    /// Whether the subscription phase has anything to apply
    pub fn touches_subscription(&self) -> bool {
        self.is_subscribed.is_some() || self.subscription_expires_at.is_some()
    }
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCounts {
    pub running: u32,
    pub failed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemHealth {
    pub status: HealthStatus,
    pub redis: bool,
    pub s3: bool,
    pub jobs: JobCounts,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawHealth {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub redis: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// Either a bare array or an object wrapping the array under a named key
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListOrWrapped<T> {
    List(Vec<T>),
    Wrapped(Map<String, Value>),
}

#[derive(Debug, Clone, Serialize)]
pub struct TestPush<'a> {
    pub title: &'a str,
    pub body: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct TestEmail<'a> {
    pub subject: &'a str,
    pub body: &'a str,
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlag {
    pub key: String,
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollout_percent: Option<f64>,
}

impl FeatureFlag {
    /// Interpret a raw flag value of any shape the server stores
    pub fn from_raw(key: &str, value: &Value) -> Self {
        let key = key.to_string();
        match value {
            Value::Object(obj) => FeatureFlag {
                key,
                enabled: obj.get("enabled").map(truthy).unwrap_or(false),
                rollout_percent: obj.get("rolloutPercent").and_then(Value::as_f64),
            },
            Value::Number(n) => {
                let n = n.as_f64().unwrap_or(0.0);
                FeatureFlag {
                    key,
                    enabled: n > 0.0,
                    rollout_percent: Some(n),
                }
            }
            Value::String(s) => FeatureFlag {
                key,
                enabled: s == "true",
                rollout_percent: parse_js_number(s),
            },
            other => FeatureFlag {
                key,
                enabled: truthy(other),
                rollout_percent: None,
            },
        }
    }
}

// JavaScript truthiness
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// Number(s) semantics: empty/blank is 0, unparsable is NaN (None)
fn parse_js_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }
    trimmed.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Payment-related global switches, stored as feature flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFlags {
    pub enable_payments: bool,
    pub enable_search_tokens: bool,
    pub enable_undo_tokens: bool,
    pub enable_message_req_tokens: bool,
}

impl PaymentFlags {
    /// Flag keys paired with their values, in update order
    pub fn entries(&self) -> [(&'static str, bool); 4] {
        [
            ("enablePayments", self.enable_payments),
            ("enableSearchTokens", self.enable_search_tokens),
            ("enableUndoTokens", self.enable_undo_tokens),
            ("enableMessageReqTokens", self.enable_message_req_tokens),
        ]
    }
}

// ---------------------------------------------------------------------------
// Export & audit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportJob {
    pub job_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportStatus {
    pub status: ExportState,
    #[serde(default)]
    pub download_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub id: String,
    pub event: String,
    #[serde(default)]
    pub payload: Option<Map<String, Value>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub admin_id: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
}

/// Paging and filters for the audit log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditQuery {
    pub limit: u32,
    pub offset: u32,
    pub admin_id: Option<String>,
    pub action: Option<String>,
    pub since: Option<String>,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            limit: 100,
            offset: 0,
            admin_id: None,
            action: None,
            since: None,
        }
    }
}
