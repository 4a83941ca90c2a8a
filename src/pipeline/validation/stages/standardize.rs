use anyhow::Result;

use super::{PipelineState, ValidationStage};
use crate::domain::{EventSnapshot, StageName, StageOutcome};
use crate::taxonomy::{self, NameResolution, StandardEventDefinition};

/// Resolves the event name against the canonical taxonomy.
///
/// Legacy aliases are migrated to their canonical form with the original
/// preserved under `_legacy_name`. Names outside the taxonomy pass through
/// untouched with an advisory warning; rejecting them is the caller's call.
pub struct StandardizationStage;

impl StandardizationStage {
    fn check_required_properties(
        def: &StandardEventDefinition,
        snapshot: &EventSnapshot,
        outcome: &mut StageOutcome,
    ) {
        let missing: Vec<&str> = def
            .required_properties
            .iter()
            .copied()
            .filter(|prop| !snapshot.has_field(prop))
            .collect();

        if !missing.is_empty() {
            outcome.warn(format!(
                "Missing required properties for {}: {}",
                def.name,
                missing.join(", ")
            ));
        }
    }
}

impl ValidationStage for StandardizationStage {
    fn name(&self) -> StageName {
        StageName::Standardization
    }

    fn apply(&self, state: &PipelineState) -> Result<StageOutcome> {
        let mut outcome = StageOutcome::passing(self.name());
        let snapshot = &state.snapshot;

        match taxonomy::resolve(&snapshot.event_name) {
            NameResolution::Canonical(def) => {
                Self::check_required_properties(def, snapshot, &mut outcome);
            }
            NameResolution::Legacy(def) => {
                let mut migrated = snapshot.clone();
                migrated.legacy_name = Some(snapshot.event_name.clone());
                migrated.event_name = def.name.to_string();
                outcome.warn(format!(
                    "Migrated legacy event: {} -> {}",
                    snapshot.event_name, def.name
                ));
                Self::check_required_properties(def, &migrated, &mut outcome);
                outcome.set_transform(migrated);
            }
            NameResolution::Unknown => {
                outcome.warn(format!("Non-standard event name: {}", snapshot.event_name));
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(raw: serde_json::Value) -> StageOutcome {
        StandardizationStage
            .apply(&PipelineState::new(&raw))
            .unwrap()
    }

    #[test]
    fn test_canonical_name_passes_untouched() {
        let outcome = run(json!({
            "event_name": "PageView",
            "properties": {}
        }));
        assert!(outcome.passed);
        assert!(outcome.transformed.is_none());
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_legacy_name_is_migrated() {
        let outcome = run(json!({
            "event_name": "page_view",
            "properties": {}
        }));
        let migrated = outcome.transformed.expect("migration produces a transform");
        assert_eq!(migrated.event_name, "PageView");
        assert_eq!(migrated.legacy_name.as_deref(), Some("page_view"));
        assert!(outcome.warnings[0].contains("Migrated legacy event"));
    }

    #[test]
    fn test_unknown_name_warns_without_transform() {
        let outcome = run(json!({
            "event_name": "newsletter_hover",
            "properties": {}
        }));
        assert!(outcome.passed);
        assert!(outcome.transformed.is_none());
        assert!(outcome.warnings[0].contains("Non-standard event name"));
    }

    #[test]
    fn test_missing_required_properties_aggregate_into_one_warning() {
        let outcome = run(json!({
            "event_name": "Purchase",
            "properties": {}
        }));
        assert_eq!(outcome.warnings.len(), 1);
        let warning = &outcome.warnings[0];
        assert!(warning.contains("value"));
        assert!(warning.contains("currency"));
        assert!(warning.contains("content_ids"));
    }

    #[test]
    fn test_required_properties_satisfied_by_top_level_fields() {
        let outcome = run(json!({
            "event_name": "Search",
            "properties": {"search_string": "boots"}
        }));
        assert!(outcome.warnings.is_empty());
    }
}
