//! Format detectors shared by the structure, data-type, and privacy stages.

use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());

static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?\(?[0-9][0-9 .()\-]{5,18}[0-9]$").unwrap());

/// 64 hex chars, the shape of a SHA-256 digest
static SHA256_HEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{64}$").unwrap());

static URI: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://\S+$").unwrap());

static SSN_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap());

static CARD_LIKE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d{4}[ \-]?\d{4}[ \-]?\d{4}[ \-]?\d{4}\b").unwrap());

static EMAIL_ANYWHERE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());

pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE.is_match(value)
}

pub fn is_hash_shaped(value: &str) -> bool {
    SHA256_HEX.is_match(value)
}

pub fn looks_like_uri(value: &str) -> bool {
    URI.is_match(value)
}

/// Structural PII detection for arbitrary string values. Returns a short
/// description of the first shape detected.
pub fn pii_shape(value: &str) -> Option<&'static str> {
    if SSN_LIKE.is_match(value) {
        return Some("an SSN-like number");
    }
    if CARD_LIKE.is_match(value) {
        return Some("a card-like number");
    }
    if EMAIL_ANYWHERE.is_match(value) {
        return Some("an embedded email address");
    }
    None
}
