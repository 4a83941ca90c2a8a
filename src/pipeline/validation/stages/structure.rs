use anyhow::Result;
use chrono::DateTime;
use serde_json::Value;

use super::patterns;
use super::{PipelineState, ValidationStage};
use crate::domain::{StageName, StageOutcome};

/// Structural checks on the raw payload: field presence and JSON types.
///
/// Reports only the first violation found. On success the coerced and
/// defaulted event becomes the stage transform.
pub struct StructureStage {
    known_platforms: Vec<String>,
}

impl StructureStage {
    pub fn new(known_platforms: Vec<String>) -> Self {
        Self { known_platforms }
    }

    fn first_violation(&self, raw: &Value) -> Option<String> {
        match raw.get("event_name") {
            None | Some(Value::Null) => {
                return Some("event_name is required".to_string());
            }
            Some(Value::String(name)) => {
                if name.trim().is_empty() {
                    return Some("event_name must not be empty".to_string());
                }
            }
            Some(_) => return Some("event_name must be a string".to_string()),
        }

        if let Some(ts) = raw.get("timestamp") {
            let valid = ts
                .as_str()
                .map(|s| DateTime::parse_from_rfc3339(s).is_ok())
                .unwrap_or(false);
            if !valid && !ts.is_null() {
                return Some("timestamp must be an ISO-8601 datetime string".to_string());
            }
        }

        for field in ["user_id", "session_id", "platform"] {
            if let Some(value) = raw.get(field) {
                if !value.is_string() && !value.is_null() {
                    return Some(format!("{} must be a string", field));
                }
            }
        }

        if let Some(props) = raw.get("properties") {
            if !props.is_object() && !props.is_null() {
                return Some("properties must be an object".to_string());
            }
        }

        if let Some(url) = raw.get("page_url") {
            let valid = url
                .as_str()
                .map(patterns::looks_like_uri)
                .unwrap_or(false);
            if !valid && !url.is_null() {
                return Some("page_url must be a valid URI".to_string());
            }
        }

        None
    }
}

impl ValidationStage for StructureStage {
    fn name(&self) -> StageName {
        StageName::Structure
    }

    fn apply(&self, state: &PipelineState) -> Result<StageOutcome> {
        let mut outcome = StageOutcome::passing(self.name());

        if let Some(violation) = self.first_violation(&state.raw) {
            outcome.fail(violation);
            return Ok(outcome);
        }

        if let Some(platform) = state.snapshot.platform.as_deref() {
            if !self.known_platforms.iter().any(|known| known == platform) {
                outcome.warn(format!("Unknown platform: {}", platform));
            }
        }

        // The lenient snapshot loses nothing once the type checks pass, so it
        // already is the coerced/defaulted event.
        outcome.set_transform(state.snapshot.clone());
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use serde_json::json;

    fn stage() -> StructureStage {
        StructureStage::new(PipelineConfig::default().known_platforms)
    }

    fn run(raw: serde_json::Value) -> StageOutcome {
        stage().apply(&PipelineState::new(&raw)).unwrap()
    }

    #[test]
    fn test_missing_event_name_fails() {
        let outcome = run(json!({"properties": {}}));
        assert!(!outcome.passed);
        assert_eq!(outcome.errors, vec!["event_name is required"]);
    }

    #[test]
    fn test_only_first_violation_is_reported() {
        let outcome = run(json!({
            "event_name": 42,
            "timestamp": "not a date",
            "properties": "also wrong"
        }));
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0], "event_name must be a string");
    }

    #[test]
    fn test_invalid_timestamp_fails() {
        let outcome = run(json!({"event_name": "PageView", "timestamp": "yesterday"}));
        assert!(!outcome.passed);
        assert!(outcome.errors[0].contains("ISO-8601"));
    }

    #[test]
    fn test_unknown_platform_warns_but_passes() {
        let outcome = run(json!({"event_name": "PageView", "platform": "smart_fridge"}));
        assert!(outcome.passed);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("smart_fridge"));
    }

    #[test]
    fn test_invalid_page_url_fails() {
        let outcome = run(json!({"event_name": "PageView", "page_url": "not a url"}));
        assert!(!outcome.passed);
        assert!(outcome.errors[0].contains("page_url"));
    }

    #[test]
    fn test_success_emits_defaulted_transform() {
        let outcome = run(json!({"event_name": "PageView"}));
        assert!(outcome.passed);
        let snapshot = outcome.transformed.expect("transform on success");
        assert_eq!(snapshot.event_name, "PageView");
        assert!(snapshot.properties.is_empty());
    }

    #[test]
    fn test_null_optionals_are_tolerated() {
        let outcome = run(json!({
            "event_name": "PageView",
            "user_id": null,
            "session_id": null
        }));
        assert!(outcome.passed);
        assert!(outcome.errors.is_empty());
    }
}
