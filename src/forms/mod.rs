//! Public Form Submission Guard
//!
//! Validation and throttling for the contact, suggestions, and support
//! ticket forms of the public site.
//!
//! [`FormGate::admit`] consults the form's limiter once per submission
//! attempt (before validation, so rejected drafts still spend budget) and
//! never calls `record_request` afterwards.

pub mod validation;

use serde::Serialize;

use crate::rate_limit::{
    format_wait, RateLimiter, CONTACT_FORM_LIMITER, SUGGESTIONS_FORM_LIMITER,
    SUPPORT_TICKET_LIMITER,
};
use validation::{
    contains_spam_patterns, generate_csrf_token, is_valid_email, is_valid_message, is_valid_name,
    is_valid_subject, sanitize_input,
};

/// Which public form a submission belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum FormKind {
    Contact,
    Suggestion,
    SupportTicket,
}

impl FormKind {
    /// Identifier of the limiter guarding this form
    pub fn limiter_key(&self) -> &'static str {
        match self {
            FormKind::Contact => CONTACT_FORM_LIMITER,
            FormKind::Suggestion => SUGGESTIONS_FORM_LIMITER,
            FormKind::SupportTicket => SUPPORT_TICKET_LIMITER,
        }
    }

    fn body_label(&self) -> &'static str {
        match self {
            FormKind::Contact => "Message",
            FormKind::Suggestion => "Suggestion",
            FormKind::SupportTicket => "Description",
        }
    }
}

/// Raw form input as typed by the visitor
#[derive(Debug, Clone)]
pub struct FormSubmission {
    pub kind: FormKind,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub body: String,
}

/// Submission after validation and sanitization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedSubmission {
    pub kind: FormKind,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub body: String,
    pub csrf_token: String,
}

/// Per-field validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl FormErrors {
    /// Number of failing fields
    pub fn len(&self) -> usize {
        [&self.name, &self.email, &self.subject, &self.body]
            .iter()
            .filter(|f| f.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} form field(s) failed validation", self.len())
    }
}

impl std::error::Error for FormErrors {}

impl FormSubmission {
    /// Validate every field and return the sanitized payload
    pub fn validate(&self) -> Result<SanitizedSubmission, FormErrors> {
        let mut errors = FormErrors::default();

        if self.name.trim().is_empty() {
            errors.name = Some("Name is required".to_string());
        } else if !is_valid_name(&self.name) {
            errors.name =
                Some("Please enter a valid name (2-100 characters, letters only)".to_string());
        }

        if self.email.trim().is_empty() {
            errors.email = Some("Email is required".to_string());
        } else if !is_valid_email(&self.email) {
            errors.email = Some("Please enter a valid email address".to_string());
        }

        if self.subject.trim().is_empty() {
            errors.subject = Some("Subject is required".to_string());
        } else if !is_valid_subject(&self.subject) {
            errors.subject = Some("Subject must be between 3 and 200 characters".to_string());
        }

        let label = self.kind.body_label();
        if self.body.trim().is_empty() {
            errors.body = Some(format!("{} is required", label));
        } else if !is_valid_message(&self.body) {
            errors.body = Some(format!("{} must be between 10 and 5000 characters", label));
        } else if contains_spam_patterns(&self.body) {
            errors.body = Some(format!(
                "{} contains suspicious content. Please revise.",
                label
            ));
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(SanitizedSubmission {
            kind: self.kind,
            name: sanitize_input(&self.name),
            email: sanitize_input(&self.email),
            subject: sanitize_input(&self.subject),
            body: sanitize_input(&self.body),
            csrf_token: generate_csrf_token(),
        })
    }
}

/// Why a submission was not admitted
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The form's limiter budget is spent
    #[error("Too many requests. Please wait {wait} before submitting again.")]
    RateLimited { retry_after_secs: u64, wait: String },

    /// One or more fields failed validation
    #[error(transparent)]
    Invalid(FormErrors),
}

/// Throttle + validate front door for one form
pub struct FormGate {
    kind: FormKind,
    limiter: RateLimiter,
}

impl FormGate {
    pub fn new(kind: FormKind, limiter: RateLimiter) -> Self {
        Self { kind, limiter }
    }

    pub fn kind(&self) -> FormKind {
        self.kind
    }

    /// Submissions left in the current window
    pub fn remaining(&self) -> u32 {
        self.limiter.remaining_requests()
    }

    /// Consume a limiter slot, then validate
    pub fn admit(&self, submission: &FormSubmission) -> Result<SanitizedSubmission, Rejection> {
        if !self.limiter.can_make_request() {
            let retry_after_secs = self.limiter.time_remaining();
            tracing::info!(
                "Rejected {:?} submission: rate limited for {}s",
                self.kind,
                retry_after_secs
            );
            return Err(Rejection::RateLimited {
                retry_after_secs,
                wait: format_wait(retry_after_secs),
            });
        }

        submission.validate().map_err(Rejection::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rate_limit::RateLimiterConfig;
    use crate::storage::MemoryStore;
    use std::sync::Arc;
    use std::time::Duration;

    fn submission() -> FormSubmission {
        FormSubmission {
            kind: FormKind::Contact,
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            subject: "Account question".to_string(),
            body: "How do I pause my profile for a while?".to_string(),
        }
    }

    fn gate(max: u32) -> FormGate {
        let limiter = RateLimiter::new(
            FormKind::Contact.limiter_key(),
            RateLimiterConfig::new(Duration::from_secs(900), max),
            Arc::new(MemoryStore::new()),
        );
        FormGate::new(FormKind::Contact, limiter)
    }

    #[test]
    fn test_valid_submission_is_sanitized() {
        let mut input = submission();
        input.subject = "  <Account> question ".to_string();

        let clean = input.validate().unwrap();
        assert_eq!(clean.subject, "Account question");
        assert_eq!(clean.csrf_token.len(), 32);
    }

    #[test]
    fn test_required_fields() {
        let input = FormSubmission {
            kind: FormKind::Suggestion,
            name: " ".to_string(),
            email: String::new(),
            subject: String::new(),
            body: String::new(),
        };

        let errors = input.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
        assert_eq!(errors.name.as_deref(), Some("Name is required"));
        assert_eq!(errors.body.as_deref(), Some("Suggestion is required"));
    }

    #[test]
    fn test_spam_body_rejected() {
        let mut input = submission();
        input.body = "Check out https://spam.example now".to_string();

        let errors = input.validate().unwrap_err();
        assert_eq!(
            errors.body.as_deref(),
            Some("Message contains suspicious content. Please revise.")
        );
    }

    #[test]
    fn test_gate_rate_limits_after_budget() {
        let gate = gate(2);
        assert!(gate.admit(&submission()).is_ok());
        assert!(gate.admit(&submission()).is_ok());

        match gate.admit(&submission()) {
            Err(Rejection::RateLimited {
                retry_after_secs,
                wait,
            }) => {
                assert_eq!(retry_after_secs, 900);
                assert_eq!(wait, "15:00");
            }
            other => panic!("expected rate limit, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_submission_still_spends_budget() {
        let gate = gate(5);
        let mut input = submission();
        input.email = "nope".to_string();

        assert!(matches!(gate.admit(&input), Err(Rejection::Invalid(_))));
        assert_eq!(gate.remaining(), 4);
    }

    #[test]
    fn test_limiter_keys() {
        assert_eq!(FormKind::Contact.limiter_key(), "contact-form-rate-limit");
        assert_eq!(
            FormKind::Suggestion.limiter_key(),
            "suggestions-form-rate-limit"
        );
        assert_eq!(
            FormKind::SupportTicket.limiter_key(),
            "support-ticket-rate-limit"
        );
    }
}
