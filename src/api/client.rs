//! Admin API Client Layer
//!
//! The client owns the request path shared by every endpoint method:
//!
//! ```text
//! RequestSpec ─► bearer token? ─► credential guard ─► Transport ─► status branch ─► decode
//!                    │                  │                               │
//!                    ▼                  ▼                               ▼
//!             Unauthenticated    CredentialInUrl        401: Session::expire()
//!                                                       404 / 500 / other: typed error
//! ```
//!
//! Endpoint methods live in [`super::endpoints`] as further `impl` blocks on
//! [`AdminApiClient`]; each is a direct mapping onto one [`RequestSpec`].

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

use super::error::ApiError;
use super::models::{LoginRequest, LoginResponse};
use super::session::{Session, SessionState};
use super::transport::{ApiRequest, ApiResponse, Transport};
use super::url::{contains_credentials, join_api_url, normalize_base_url, redact_bearer};

/// Endpoint used for password login
pub const LOGIN_ENDPOINT: &str = "/admin/login";

/// Endpoint whose success proves the caller is an admin
pub const ADMIN_CHECK_ENDPOINT: &str = "/admin/admins";

/// One endpoint call before authentication is attached
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    pub method: Method,
    pub endpoint: String,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl RequestSpec {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            body: None,
            headers: Vec::new(),
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    pub fn patch(endpoint: impl Into<String>) -> Self {
        Self::new(Method::PATCH, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(Method::DELETE, endpoint)
    }

    /// Attach a JSON body
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a header; later headers override the defaults
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Authenticated client for the admin REST API
///
/// Generic over the [`Transport`] so tests can script responses.
pub struct AdminApiClient<T>
where
    T: Transport,
{
    transport: T,
    base_url: String,
    session: Arc<Session>,
}

impl<T> AdminApiClient<T>
where
    T: Transport,
{
    /// Create a client; `base_url` is normalized and scrubbed of credentials
    pub fn new(transport: T, base_url: &str, session: Arc<Session>) -> Self {
        Self {
            transport,
            base_url: normalize_base_url(base_url),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute `request` and decode the success body into `R`
    pub async fn execute<R>(&self, request: RequestSpec) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
    {
        let endpoint = request.endpoint.clone();
        let response = self.send(request).await?;

        serde_json::from_str(&response.body).map_err(|source| ApiError::Decode { endpoint, source })
    }

    /// Execute `request` and ignore the success body
    pub async fn execute_unit(&self, request: RequestSpec) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }

    /// Authenticated request with status branching
    async fn send(&self, request: RequestSpec) -> Result<ApiResponse, ApiError> {
        let endpoint = request.endpoint.clone();
        let response = self.dispatch(request).await?;

        if response.is_success() {
            return Ok(response);
        }

        Err(self.status_error(&endpoint, &response))
    }

    /// Attach credentials, guard the URL and hand the request to the transport
    async fn dispatch(&self, request: RequestSpec) -> Result<ApiResponse, ApiError> {
        let token = self.session.bearer_token()?;

        if contains_credentials(&request.endpoint) {
            return Err(ApiError::CredentialInUrl("endpoint"));
        }

        let url = join_api_url(&self.base_url, &request.endpoint);
        if contains_credentials(&url) {
            tracing::error!("Final URL contains credentials: {}", redact_bearer(&url));
            return Err(ApiError::CredentialInUrl("URL"));
        }

        let mut headers = vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            ("Authorization".to_string(), format!("Bearer {}", token)),
        ];
        headers.extend(request.headers);

        let outgoing = ApiRequest {
            method: request.method,
            url,
            headers,
            body: request.body,
        };

        self.transport
            .execute(outgoing)
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: request.endpoint,
                source,
            })
    }

    fn status_error(&self, endpoint: &str, response: &ApiResponse) -> ApiError {
        let body: Option<Value> = serde_json::from_str(&response.body).ok();
        let message = body.as_ref().and_then(|b| string_field(b, "message"));

        match response.status {
            401 => {
                tracing::warn!("{} returned 401; clearing credentials", endpoint);
                self.session.expire();
                ApiError::AuthenticationExpired
            }
            404 => ApiError::NotFound(match (&body, message) {
                (None, _) => "Endpoint not found".to_string(),
                (Some(_), Some(message)) => message,
                (Some(_), None) => format!("Endpoint not implemented: {}", endpoint),
            }),
            500 => ApiError::Server(match (&body, message) {
                (None, _) => "Internal server error".to_string(),
                (Some(_), Some(message)) => message,
                (Some(b), None) => format!(
                    "Server error (500): {}",
                    string_field(b, "error")
                        .unwrap_or_else(|| "An unexpected error occurred on the server".to_string())
                ),
            }),
            status => ApiError::Http {
                status,
                message: match (&body, message) {
                    (None, _) => "Request failed".to_string(),
                    (Some(_), Some(message)) => message,
                    (Some(_), None) => format!("HTTP {}", status),
                },
            },
        }
    }

    /// Exchange email and password for a bearer token
    ///
    /// The only call that does not require stored credentials. On success
    /// the session enters `Authenticated`.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let url = join_api_url(&self.base_url, LOGIN_ENDPOINT);
        let body = serde_json::to_value(LoginRequest { email, password }).map_err(|source| {
            ApiError::Decode {
                endpoint: LOGIN_ENDPOINT.to_string(),
                source,
            }
        })?;

        let request = ApiRequest {
            method: Method::POST,
            url,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body),
        };

        let response = self
            .transport
            .execute(request)
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: LOGIN_ENDPOINT.to_string(),
                source,
            })?;

        if !response.is_success() {
            let message = serde_json::from_str::<Value>(&response.body)
                .ok()
                .and_then(|b| string_field(&b, "message"))
                .unwrap_or_else(|| "Login failed".to_string());
            tracing::warn!("Login for {} rejected with HTTP {}", email, response.status);
            return Err(ApiError::LoginFailed(message));
        }

        let login: LoginResponse =
            serde_json::from_str(&response.body).map_err(|source| ApiError::Decode {
                endpoint: LOGIN_ENDPOINT.to_string(),
                source,
            })?;

        match login.token.filter(|t| !t.is_empty()) {
            Some(token) => self.session.establish(&token, email),
            None => Err(ApiError::LoginFailed("Login failed: token missing".to_string())),
        }
    }

    /// Whether the stored token belongs to an admin account
    ///
    /// 2xx from the admin list means admin and 403 means signed in without
    /// admin rights. Every other status goes through the usual status
    /// branching, so a 401 expires the session and a 5xx is an error.
    pub async fn verify_admin(&self) -> Result<bool, ApiError> {
        let response = self.dispatch(RequestSpec::get(ADMIN_CHECK_ENDPOINT)).await?;
        match response.status {
            _ if response.is_success() => Ok(true),
            403 => Ok(false),
            _ => Err(self.status_error(ADMIN_CHECK_ENDPOINT, &response)),
        }
    }

    /// Re-validate stored credentials at startup
    ///
    /// Credentials of a non-admin account (403) are cleared and a rejected
    /// token (401) expires the session. Server and transport failures are
    /// returned and leave the credentials in place.
    pub async fn restore_session(&self) -> Result<SessionState, ApiError> {
        let state = self.session.state();
        if !matches!(state, SessionState::Authenticated { .. }) {
            return Ok(state);
        }

        match self.verify_admin().await {
            Ok(true) => Ok(state),
            Ok(false) => {
                tracing::warn!("Stored credentials are not an admin account; signing out");
                self.session.logout();
                Ok(self.session.state())
            }
            Err(ApiError::AuthenticationExpired) => Ok(self.session.state()),
            Err(ApiError::Unauthenticated) => {
                self.session.logout();
                Ok(self.session.state())
            }
            Err(e) => Err(e),
        }
    }

    /// Clear stored credentials
    pub fn logout(&self) {
        self.session.logout();
    }
}

// Non-empty string field of a JSON object
fn string_field(body: &Value, field: &str) -> Option<String> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::session::{EMAIL_KEY, TOKEN_KEY};
    use crate::api::testing::{authenticated_client, MockTransport};
    use crate::storage::{KeyValueStore, MemoryStore};
    use serde_json::json;

    #[tokio::test]
    async fn test_no_token_sends_nothing() {
        let store = MemoryStore::new();
        let session = Arc::new(Session::load(Arc::new(store)).unwrap());
        let client = AdminApiClient::new(MockTransport::new(), "https://api.test/api", session);

        let result: Result<Value, _> = client.execute(RequestSpec::get("/admin/users/stats")).await;

        assert!(matches!(result, Err(ApiError::Unauthenticated)));
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_headers_and_url() {
        let (client, _store) = authenticated_client();
        client.transport().push(200, r#"{"totalUsers":3,"activeUsers":1}"#);

        let _: Value = client
            .execute(RequestSpec::get("/admin/users/stats").with_header("X-Trace", "1"))
            .await
            .unwrap();

        let requests = client.transport().requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.url, "https://api.test/api/admin/users/stats");
        assert_eq!(request.header("authorization"), Some("Bearer test-token"));
        assert_eq!(request.header("content-type"), Some("application/json"));
        assert_eq!(request.header("x-trace"), Some("1"));
    }

    #[tokio::test]
    async fn test_credential_in_endpoint_rejected() {
        let (client, _store) = authenticated_client();

        let result = client
            .execute_unit(RequestSpec::get("/admin/users?token=abc"))
            .await;

        assert!(matches!(result, Err(ApiError::CredentialInUrl("endpoint"))));
        assert!(client.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn test_401_expires_session() {
        let (client, store) = authenticated_client();
        let mut rx = client.session().subscribe();
        client.transport().push(401, r#"{"message":"jwt expired"}"#);

        let result = client.execute_unit(RequestSpec::get("/admin/photos")).await;
        assert!(matches!(result, Err(ApiError::AuthenticationExpired)));
        assert_eq!(*rx.borrow_and_update(), SessionState::Expired);
        assert!(store.get(TOKEN_KEY).unwrap().is_none());
        assert!(store.get(EMAIL_KEY).unwrap().is_none());

        let again = client.execute_unit(RequestSpec::get("/admin/photos")).await;
        assert!(matches!(again, Err(ApiError::Unauthenticated)));
        assert_eq!(client.transport().requests().len(), 1);
    }

    #[tokio::test]
    async fn test_404_messages() {
        let (client, _store) = authenticated_client();
        client.transport().push(404, r#"{"message":"No such user"}"#);
        client.transport().push(404, r#"{}"#);
        client.transport().push(404, "<html>nope</html>");

        let first = client.execute_unit(RequestSpec::get("/admin/users/x")).await;
        let second = client.execute_unit(RequestSpec::get("/admin/jobs")).await;
        let third = client.execute_unit(RequestSpec::get("/admin/jobs")).await;

        assert_eq!(first.unwrap_err().to_string(), "No such user");
        assert_eq!(
            second.unwrap_err().to_string(),
            "Endpoint not implemented: /admin/jobs"
        );
        assert_eq!(third.unwrap_err().to_string(), "Endpoint not found");
    }

    #[tokio::test]
    async fn test_500_messages() {
        let (client, _store) = authenticated_client();
        client.transport().push(500, r#"{"error":"db down"}"#);
        client.transport().push(500, r#"{}"#);
        client.transport().push(500, "oops");

        let first = client.execute_unit(RequestSpec::get("/admin/health")).await;
        let second = client.execute_unit(RequestSpec::get("/admin/health")).await;
        let third = client.execute_unit(RequestSpec::get("/admin/health")).await;

        assert_eq!(first.unwrap_err().to_string(), "Server error (500): db down");
        assert_eq!(
            second.unwrap_err().to_string(),
            "Server error (500): An unexpected error occurred on the server"
        );
        let third = third.unwrap_err();
        assert!(matches!(third, ApiError::Server(_)));
        assert_eq!(third.to_string(), "Internal server error");
    }

    #[tokio::test]
    async fn test_other_status_messages() {
        let (client, store) = authenticated_client();
        client.transport().push(403, r#"{"message":"Forbidden"}"#);
        client.transport().push(429, r#"{"retry":5}"#);
        client.transport().push(502, "Bad gateway");

        let first = client.execute_unit(RequestSpec::get("/admin/flags")).await;
        let second = client.execute_unit(RequestSpec::get("/admin/flags")).await;
        let third = client.execute_unit(RequestSpec::get("/admin/flags")).await;

        assert_eq!(first.unwrap_err().to_string(), "Forbidden");
        let second = second.unwrap_err();
        assert_eq!(second.status(), Some(429));
        assert_eq!(second.to_string(), "HTTP 429");
        assert_eq!(third.unwrap_err().to_string(), "Request failed");

        // only 401 tears the session down
        assert!(store.get(TOKEN_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_decode_failure() {
        let (client, _store) = authenticated_client();
        client.transport().push(200, r#"{"unexpected":true}"#);

        let result: Result<crate::api::models::UserStats, _> =
            client.execute(RequestSpec::get("/admin/users/stats")).await;

        match result {
            Err(ApiError::Decode { endpoint, .. }) => assert_eq!(endpoint, "/admin/users/stats"),
            other => panic!("expected decode error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let (client, _store) = authenticated_client();

        // no scripted response
        let result = client.execute_unit(RequestSpec::get("/admin/health")).await;
        assert!(matches!(result, Err(ApiError::Transport { .. })));
    }

    #[tokio::test]
    async fn test_login_establishes_session() {
        let store = MemoryStore::new();
        let session = Arc::new(Session::load(Arc::new(store.clone())).unwrap());
        let client = AdminApiClient::new(MockTransport::new(), "https://api.test/api/", session);
        client
            .transport()
            .push(200, r#"{"token":"fresh","refreshToken":"r"}"#);

        client.login("ops@example.com", "hunter2").await.unwrap();

        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("fresh"));
        assert_eq!(
            client.session().state(),
            SessionState::Authenticated {
                email: "ops@example.com".to_string()
            }
        );

        let request = &client.transport().requests()[0];
        assert_eq!(request.url, "https://api.test/api/admin/login");
        assert!(request.header("authorization").is_none());
        assert_eq!(
            request.body,
            Some(json!({"email": "ops@example.com", "password": "hunter2"}))
        );
    }

    #[tokio::test]
    async fn test_login_failures() {
        let store = MemoryStore::new();
        let session = Arc::new(Session::load(Arc::new(store.clone())).unwrap());
        let client = AdminApiClient::new(MockTransport::new(), "https://api.test/api", session);
        client
            .transport()
            .push(401, r#"{"message":"Invalid credentials"}"#);
        client.transport().push(400, "not json");
        client.transport().push(200, r#"{"refreshToken":"r"}"#);

        let first = client.login("a@b.co", "x").await.unwrap_err();
        let second = client.login("a@b.co", "x").await.unwrap_err();
        let third = client.login("a@b.co", "x").await.unwrap_err();

        assert_eq!(first.to_string(), "Invalid credentials");
        assert_eq!(second.to_string(), "Login failed");
        assert_eq!(third.to_string(), "Login failed: token missing");
        assert!(store.is_empty());
        assert_eq!(client.session().state(), SessionState::Anonymous);
    }

    #[tokio::test]
    async fn test_restore_session() {
        let (client, _store) = authenticated_client();
        client.transport().push(200, "[]");
        let state = client.restore_session().await.unwrap();
        assert!(matches!(state, SessionState::Authenticated { .. }));

        client.transport().push(403, r#"{"message":"Forbidden"}"#);
        let state = client.restore_session().await.unwrap();
        assert_eq!(state, SessionState::Anonymous);
        assert!(client.session().bearer_token().is_err());
    }

    #[tokio::test]
    async fn test_restore_session_keeps_credentials_on_transport_error() {
        let (client, store) = authenticated_client();

        let result = client.restore_session().await;
        assert!(matches!(result, Err(ApiError::Transport { .. })));
        assert!(store.get(TOKEN_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_restore_session_keeps_credentials_on_server_error() {
        let (client, store) = authenticated_client();
        client.transport().push(503, r#"{"message":"maintenance"}"#);

        let err = client.restore_session().await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "maintenance");
        assert!(matches!(
            client.session().state(),
            SessionState::Authenticated { .. }
        ));
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("test-token"));
    }

    #[tokio::test]
    async fn test_restore_session_expires_on_401() {
        let (client, store) = authenticated_client();
        client.transport().push(401, r#"{"message":"jwt expired"}"#);

        let state = client.restore_session().await.unwrap();
        assert_eq!(state, SessionState::Expired);
        assert!(store.get(TOKEN_KEY).unwrap().is_none());
    }

    #[test]
    fn test_base_url_normalized() {
        let (client, _store) = authenticated_client();
        assert_eq!(client.base_url(), "https://api.test/api");
    }
}
