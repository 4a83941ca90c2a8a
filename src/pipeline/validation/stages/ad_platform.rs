use anyhow::Result;
use serde_json::Value;

use super::{PipelineState, ValidationStage};
use crate::domain::{EventSnapshot, StageName, StageOutcome};
use crate::taxonomy::{self, EventCategory};

/// Conversion-API forwarding checks.
///
/// Everything here is advisory: an event that cannot be forwarded is still a
/// valid analytics event. The final readiness verdict is computed after all
/// stages, from the finished snapshot.
pub struct AdPlatformStage;

/// Required conversion params missing from the snapshot, if it is mapped.
fn missing_params(snapshot: &EventSnapshot) -> Vec<&'static str> {
    match taxonomy::conversion_mapping(&snapshot.event_name) {
        Some(mapping) => mapping
            .required_params
            .iter()
            .copied()
            .filter(|param| !snapshot.has_field(param))
            .collect(),
        None => Vec::new(),
    }
}

/// Whether the event can be forwarded to a server-side conversion API:
/// mapped, identified, and carrying every required parameter.
pub fn is_ready(snapshot: &EventSnapshot) -> bool {
    taxonomy::conversion_mapping(&snapshot.event_name).is_some()
        && snapshot.has_user_signal()
        && missing_params(snapshot).is_empty()
}

impl ValidationStage for AdPlatformStage {
    fn name(&self) -> StageName {
        StageName::AdPlatformReadiness
    }

    fn apply(&self, state: &PipelineState) -> Result<StageOutcome> {
        let mut outcome = StageOutcome::passing(self.name());
        let snapshot = &state.snapshot;

        match taxonomy::conversion_mapping(&snapshot.event_name) {
            None => {
                outcome.warn(format!(
                    "No ad-platform mapping for event: {}",
                    snapshot.event_name
                ));
            }
            Some(mapping) => {
                let missing = missing_params(snapshot);
                if !missing.is_empty() {
                    outcome.warn(format!(
                        "Missing ad-platform parameters for {}: {}",
                        snapshot.event_name,
                        missing.join(", ")
                    ));
                }

                // Conversion APIs expect content_ids as an array even when the
                // SDK sent a single id.
                if mapping.category == EventCategory::Ecommerce {
                    if let Some(ids) = snapshot.property("content_ids") {
                        if !ids.is_array() && !ids.is_null() {
                            let mut work = snapshot.clone();
                            work.properties.insert(
                                "content_ids".to_string(),
                                Value::Array(vec![ids.clone()]),
                            );
                            outcome.set_transform(work);
                        }
                    }
                }
            }
        }

        if !snapshot.has_user_signal() {
            outcome.warn("No user identification signal (user_id, email, or phone)");
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(raw: serde_json::Value) -> StageOutcome {
        AdPlatformStage.apply(&PipelineState::new(&raw)).unwrap()
    }

    #[test]
    fn test_unmapped_event_warns_but_passes() {
        let outcome = run(json!({
            "event_name": "Contact",
            "user_id": "u1",
            "properties": {}
        }));
        assert!(outcome.passed);
        assert!(outcome.warnings[0].contains("No ad-platform mapping"));
    }

    #[test]
    fn test_missing_params_aggregate_into_one_warning() {
        let outcome = run(json!({
            "event_name": "Purchase",
            "user_id": "u1",
            "properties": {}
        }));
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].contains("value"));
        assert!(outcome.warnings[0].contains("content_ids"));
    }

    #[test]
    fn test_missing_identification_warns() {
        let outcome = run(json!({
            "event_name": "PageView",
            "properties": {}
        }));
        assert!(outcome.warnings[0].contains("identification"));
    }

    #[test]
    fn test_scalar_content_ids_is_normalized_to_array() {
        let outcome = run(json!({
            "event_name": "AddToCart",
            "user_id": "u1",
            "properties": {
                "content_ids": "p1",
                "content_type": "product",
                "value": 10,
                "currency": "USD"
            }
        }));
        let snapshot = outcome.transformed.expect("normalization produces a transform");
        assert_eq!(snapshot.property("content_ids"), Some(&json!(["p1"])));
    }

    #[test]
    fn test_readiness_needs_mapping_identity_and_params() {
        let ready = EventSnapshot::lenient(&json!({
            "event_name": "AddToCart",
            "user_id": "u1",
            "properties": {
                "content_ids": ["p1"],
                "content_type": "product",
                "value": 10,
                "currency": "USD"
            }
        }));
        assert!(is_ready(&ready));

        let unidentified = EventSnapshot::lenient(&json!({
            "event_name": "AddToCart",
            "properties": {
                "content_ids": ["p1"],
                "content_type": "product",
                "value": 10,
                "currency": "USD"
            }
        }));
        assert!(!is_ready(&unidentified));

        let unmapped = EventSnapshot::lenient(&json!({
            "event_name": "Contact",
            "user_id": "u1",
            "properties": {}
        }));
        assert!(!is_ready(&unmapped));
    }
}
