//! Input sanitization and field validators for the public forms

use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;

/// Maximum length kept by [`sanitize_input`]
pub const MAX_INPUT_CHARS: usize = 10_000;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern");
    static ref NAME_RE: Regex = Regex::new(r"^[a-zA-Z\s'-]+$").expect("valid name pattern");
    static ref URL_RE: Regex = Regex::new(r"(?i)(http|https|www\.)").expect("valid url pattern");
    static ref CAPS_RE: Regex = Regex::new(r"[A-Z]{10,}").expect("valid caps pattern");
    static ref CSRF_RE: Regex = Regex::new(r"^[a-f0-9]{32}$").expect("valid csrf pattern");
}

/// Strip angle brackets, trim, and cap the length
pub fn sanitize_input(input: &str) -> String {
    let stripped: String = input.chars().filter(|c| *c != '<' && *c != '>').collect();
    stripped.trim().chars().take(MAX_INPUT_CHARS).collect()
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email) && email.chars().count() <= 254
}

/// Letters, whitespace, hyphens and apostrophes; 2 to 100 characters
pub fn is_valid_name(name: &str) -> bool {
    let len = name.chars().count();
    NAME_RE.is_match(name) && (2..=100).contains(&len)
}

pub fn is_valid_message(message: &str) -> bool {
    let len = sanitize_input(message).chars().count();
    (10..=5000).contains(&len)
}

pub fn is_valid_subject(subject: &str) -> bool {
    let len = sanitize_input(subject).chars().count();
    (3..=200).contains(&len)
}

/// Links, shouting, or a character repeated five or more times
pub fn contains_spam_patterns(text: &str) -> bool {
    URL_RE.is_match(text) || CAPS_RE.is_match(text) || has_repeated_run(text, 5)
}

// regex has no backreferences
fn has_repeated_run(text: &str, run: usize) -> bool {
    let mut prev = None;
    let mut count = 0;
    for c in text.chars() {
        if Some(c) == prev {
            count += 1;
        } else {
            prev = Some(c);
            count = 1;
        }
        if count >= run {
            return true;
        }
    }
    false
}

/// 16 random bytes as 32 lowercase hex characters
pub fn generate_csrf_token() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

pub fn is_valid_csrf_token(token: &str) -> bool {
    CSRF_RE.is_match(token)
}
