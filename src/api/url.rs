//! API URL helpers
//!
//! Joins the configured base URL with endpoint paths and guards against
//! credentials ending up inside a URL.

use lazy_static::lazy_static;
use regex::Regex;

/// Production API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.evendating.us/api";

/// Substrings that indicate a credential was placed in a URL
pub const CREDENTIAL_MARKERS: [&str; 3] = ["Bearer ", "token=", "auth="];

lazy_static! {
    static ref BEARER_RE: Regex = Regex::new(r"Bearer\s+[\w.-]+").expect("valid bearer pattern");
}

/// Whether `s` contains any credential marker
pub fn contains_credentials(s: &str) -> bool {
    CREDENTIAL_MARKERS.iter().any(|m| s.contains(m))
}

/// Replace `Bearer <token>` sequences with a placeholder
pub fn redact_bearer(s: &str) -> String {
    BEARER_RE.replace_all(s, "[TOKEN_REDACTED]").into_owned()
}

/// Strip trailing slashes and cut away anything from a credential marker on
pub fn normalize_base_url(raw: &str) -> String {
    let mut base = raw.trim().trim_end_matches('/').to_string();

    if contains_credentials(&base) {
        tracing::error!(
            "API base URL appears to contain credentials; stripping them before use"
        );
        for marker in CREDENTIAL_MARKERS {
            if let Some(idx) = base.find(marker) {
                base.truncate(idx);
            }
        }
        base = base.trim_end_matches('/').to_string();
    }

    base
}

/// Join `base` and `endpoint` with exactly one slash between them
pub fn join_api_url(base: &str, endpoint: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

/// Form-encoded query string builder; renders nothing when empty
#[derive(Debug, Default)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair
    pub fn push(mut self, key: &str, value: impl ToString) -> Self {
        self.pairs.push((key.to_string(), value.to_string()));
        self
    }

    /// Append a pair only when `value` is present
    pub fn push_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.push(key, v),
            None => self,
        }
    }

    /// Append `?query` to `path` if any pairs were added
    pub fn apply(&self, path: &str) -> String {
        if self.pairs.is_empty() {
            return path.to_string();
        }

        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in &self.pairs {
            serializer.append_pair(k, v);
        }
        format!("{}?{}", path, serializer.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_api_url() {
        let base = "https://api.evendating.us/api";
        assert_eq!(
            join_api_url(base, "/admin/photos"),
            "https://api.evendating.us/api/admin/photos"
        );
        assert_eq!(
            join_api_url("https://api.evendating.us/api//", "//admin/photos"),
            "https://api.evendating.us/api/admin/photos"
        );
        assert_eq!(
            join_api_url(base, "admin/photos"),
            "https://api.evendating.us/api/admin/photos"
        );
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(
            normalize_base_url("https://api.example.com/api///"),
            "https://api.example.com/api"
        );
        assert_eq!(
            normalize_base_url("https://api.example.com/api/?token=abc"),
            "https://api.example.com/api/?"
        );
        assert_eq!(
            normalize_base_url("https://api.example.com/auth=x/"),
            "https://api.example.com"
        );
    }

    #[test]
    fn test_contains_credentials() {
        assert!(contains_credentials("/admin/users?token=abc"));
        assert!(contains_credentials("Bearer abc"));
        assert!(contains_credentials("/x?auth=1"));
        assert!(!contains_credentials("/admin/users/u1/tokens/grant"));
    }

    #[test]
    fn test_redact_bearer() {
        assert_eq!(
            redact_bearer("https://x/Bearer abc.def-123/y"),
            "https://x/[TOKEN_REDACTED]/y"
        );
    }

    #[test]
    fn test_query_string() {
        let empty = QueryString::new();
        assert_eq!(empty.apply("/admin/reviews"), "/admin/reviews");

        let q = QueryString::new()
            .push("limit", 100)
            .push_opt("action", Some("ban user"))
            .push_opt::<&str>("since", None);
        assert_eq!(
            q.apply("/admin/audit"),
            "/admin/audit?limit=100&action=ban+user"
        );
    }
}
