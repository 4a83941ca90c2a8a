use anyhow::Result;
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::patterns;
use super::{PipelineState, ValidationStage};
use crate::domain::{EventSnapshot, StageName, StageOutcome};

/// Fields that are PII by definition and must arrive hashed
pub const PII_FIELDS: &[&str] = &["email", "phone", "first_name", "last_name", "address"];

/// PII hygiene and consent checks.
///
/// The fixed field list catches the usual suspects; the structural scan over
/// every other string property is the second line of defense against PII
/// smuggled in under custom keys.
pub struct PrivacyStage;

/// Canonical identifier normalization for conversion APIs: trim, lowercase,
/// SHA-256, lowercase hex.
pub fn sha256_hex(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.trim().to_lowercase().as_bytes());
    hex::encode(hasher.finalize())
}

/// True if any fixed PII field is present as a plain, unhashed string.
pub fn has_unhashed_pii(snapshot: &EventSnapshot) -> bool {
    PII_FIELDS.iter().any(|field| {
        snapshot
            .property_str(field)
            .map(|value| !patterns::is_hash_shaped(value))
            .unwrap_or(false)
    })
}

fn consent_flag(snapshot: &EventSnapshot) -> Option<Value> {
    if let Some(value) = snapshot.property("consent_granted") {
        return Some(value.clone());
    }
    snapshot.consent_granted.map(Value::Bool)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => matches!(s.to_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    }
}

/// True if the consent flag is present and truthy.
pub fn consent_given(snapshot: &EventSnapshot) -> bool {
    consent_flag(snapshot).map(|v| is_truthy(&v)).unwrap_or(false)
}

/// The privacy-compliance verdict: nothing unhashed in the fixed PII fields
/// and an affirmative consent flag.
pub fn is_compliant(snapshot: &EventSnapshot) -> bool {
    !has_unhashed_pii(snapshot) && consent_given(snapshot)
}

impl ValidationStage for PrivacyStage {
    fn name(&self) -> StageName {
        StageName::Privacy
    }

    fn apply(&self, state: &PipelineState) -> Result<StageOutcome> {
        let mut outcome = StageOutcome::passing(self.name());
        let snapshot = &state.snapshot;

        for field in PII_FIELDS {
            if let Some(value) = snapshot.property_str(field) {
                if !patterns::is_hash_shaped(value) {
                    outcome.warn(format!("{} should be hashed before transmission", field));
                }
            }
        }

        for (key, value) in &snapshot.properties {
            if PII_FIELDS.contains(&key.as_str()) {
                continue;
            }
            if let Some(text) = value.as_str() {
                if patterns::is_hash_shaped(text) {
                    continue;
                }
                if let Some(shape) = patterns::pii_shape(text) {
                    outcome.warn(format!("Property '{}' appears to contain {}", key, shape));
                }
            }
        }

        if consent_flag(snapshot).is_none() {
            outcome.warn("consent_granted flag not present");
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(raw: serde_json::Value) -> StageOutcome {
        PrivacyStage.apply(&PipelineState::new(&raw)).unwrap()
    }

    #[test]
    fn test_plain_email_is_flagged() {
        let outcome = run(json!({
            "event_name": "Lead",
            "properties": {"email": "a@b.com", "consent_granted": true}
        }));
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("should be hashed"));
    }

    #[test]
    fn test_hashed_email_is_not_flagged() {
        let outcome = run(json!({
            "event_name": "Lead",
            "properties": {"email": sha256_hex("a@b.com"), "consent_granted": true}
        }));
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_custom_property_scan_catches_structural_pii() {
        let outcome = run(json!({
            "event_name": "Lead",
            "properties": {
                "notes": "ssn 123-45-6789",
                "card_memo": "4111 1111 1111 1111",
                "consent_granted": true
            }
        }));
        assert_eq!(outcome.warnings.len(), 2);
        assert!(outcome.warnings.iter().any(|w| w.contains("'notes'")));
        assert!(outcome.warnings.iter().any(|w| w.contains("'card_memo'")));
    }

    #[test]
    fn test_missing_consent_warns() {
        let outcome = run(json!({"event_name": "PageView", "properties": {}}));
        assert_eq!(outcome.warnings, vec!["consent_granted flag not present"]);
    }

    #[test]
    fn test_top_level_consent_is_honored() {
        let raw = json!({
            "event_name": "PageView",
            "consent_granted": true,
            "properties": {}
        });
        let outcome = run(raw.clone());
        assert!(outcome.warnings.is_empty());
        assert!(consent_given(&EventSnapshot::lenient(&raw)));
    }

    #[test]
    fn test_falsy_consent_counts_as_present_but_not_given() {
        let raw = json!({
            "event_name": "PageView",
            "properties": {"consent_granted": false}
        });
        let outcome = run(raw.clone());
        assert!(outcome.warnings.is_empty());
        assert!(!consent_given(&EventSnapshot::lenient(&raw)));
    }

    #[test]
    fn test_compliance_needs_hashing_and_consent() {
        let compliant = EventSnapshot::lenient(&json!({
            "event_name": "Lead",
            "properties": {"email": sha256_hex("a@b.com"), "consent_granted": true}
        }));
        assert!(is_compliant(&compliant));

        let unhashed = EventSnapshot::lenient(&json!({
            "event_name": "Lead",
            "properties": {"email": "a@b.com", "consent_granted": true}
        }));
        assert!(!is_compliant(&unhashed));

        let no_consent = EventSnapshot::lenient(&json!({
            "event_name": "Lead",
            "properties": {"email": sha256_hex("a@b.com")}
        }));
        assert!(!is_compliant(&no_consent));
    }

    #[test]
    fn test_sha256_hex_normalizes_case_and_whitespace() {
        assert_eq!(sha256_hex(" A@B.com "), sha256_hex("a@b.com"));
        assert_eq!(sha256_hex("a@b.com").len(), 64);
    }
}
