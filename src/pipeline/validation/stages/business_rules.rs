use anyhow::Result;

use super::{PipelineState, ValidationStage};
use crate::domain::{EventSnapshot, StageName, StageOutcome};

/// Semantic checks per canonical event.
///
/// The line between error and warning: errors are provably wrong or
/// analytically meaningless facts, warnings are missing-but-plausible
/// enrichment.
trait BusinessRule: Send + Sync {
    fn applies_to(&self, event_name: &str) -> bool;

    fn check(&self, snapshot: &EventSnapshot, outcome: &mut StageOutcome);
}

/// Cart and purchase events are meaningless without a subject.
struct CartSubjectRule;

impl BusinessRule for CartSubjectRule {
    fn applies_to(&self, event_name: &str) -> bool {
        matches!(event_name, "AddToCart" | "Purchase")
    }

    fn check(&self, snapshot: &EventSnapshot, outcome: &mut StageOutcome) {
        if !snapshot.has_field("product_id") && !snapshot.has_field("content_ids") {
            outcome.fail(format!(
                "{} requires product_id or content_ids",
                snapshot.event_name
            ));
        }
        if !snapshot.has_field("value") && !snapshot.has_field("price") {
            outcome.warn(format!(
                "{} has no value or price attached",
                snapshot.event_name
            ));
        }
    }
}

/// A purchase must be traceable and its amount must be positive.
struct PurchaseIntegrityRule;

impl BusinessRule for PurchaseIntegrityRule {
    fn applies_to(&self, event_name: &str) -> bool {
        event_name == "Purchase"
    }

    fn check(&self, snapshot: &EventSnapshot, outcome: &mut StageOutcome) {
        if !snapshot.has_field("order_id") && !snapshot.has_field("transaction_id") {
            outcome.warn("Purchase has no order_id or transaction_id");
        }
        if let Some(value) = snapshot.property_f64("value") {
            if value <= 0.0 {
                outcome.fail(format!(
                    "Purchase value must be greater than 0, got {}",
                    value
                ));
            }
        }
    }
}

/// Anonymous leads are plausible, so missing contact details only warn.
struct LeadContactRule;

impl BusinessRule for LeadContactRule {
    fn applies_to(&self, event_name: &str) -> bool {
        matches!(event_name, "Lead" | "CompleteRegistration")
    }

    fn check(&self, snapshot: &EventSnapshot, outcome: &mut StageOutcome) {
        if !snapshot.has_field("email") && !snapshot.has_field("phone") {
            outcome.warn(format!(
                "{} has neither email nor phone",
                snapshot.event_name
            ));
        }
    }
}

/// Dispatches the rule set against the standardized event name.
pub struct BusinessRulesStage {
    rules: Vec<Box<dyn BusinessRule>>,
}

impl BusinessRulesStage {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(CartSubjectRule),
                Box::new(PurchaseIntegrityRule),
                Box::new(LeadContactRule),
            ],
        }
    }
}

impl Default for BusinessRulesStage {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationStage for BusinessRulesStage {
    fn name(&self) -> StageName {
        StageName::BusinessRules
    }

    fn apply(&self, state: &PipelineState) -> Result<StageOutcome> {
        let mut outcome = StageOutcome::passing(self.name());
        let snapshot = &state.snapshot;

        for rule in &self.rules {
            if rule.applies_to(&snapshot.event_name) {
                rule.check(snapshot, &mut outcome);
            }
        }

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EventSnapshot;
    use serde_json::json;

    fn snapshot(raw: serde_json::Value) -> EventSnapshot {
        EventSnapshot::lenient(&raw)
    }

    fn check<R: BusinessRule>(rule: R, raw: serde_json::Value) -> StageOutcome {
        let mut outcome = StageOutcome::passing(StageName::BusinessRules);
        rule.check(&snapshot(raw), &mut outcome);
        outcome
    }

    #[test]
    fn test_cart_without_subject_is_an_error() {
        let outcome = check(
            CartSubjectRule,
            json!({"event_name": "AddToCart", "properties": {"value": 10}}),
        );
        assert!(!outcome.passed);
        assert!(outcome.errors[0].contains("product_id or content_ids"));
    }

    #[test]
    fn test_cart_without_value_only_warns() {
        let outcome = check(
            CartSubjectRule,
            json!({"event_name": "AddToCart", "properties": {"content_ids": ["p1"]}}),
        );
        assert!(outcome.passed);
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn test_nonpositive_purchase_value_is_an_error() {
        let outcome = check(
            PurchaseIntegrityRule,
            json!({"event_name": "Purchase", "properties": {"value": -5.0, "order_id": "o1"}}),
        );
        assert!(!outcome.passed);
        assert!(outcome.errors[0].contains("greater than 0"));
    }

    #[test]
    fn test_missing_order_reference_only_warns() {
        let outcome = check(
            PurchaseIntegrityRule,
            json!({"event_name": "Purchase", "properties": {"value": 5.0}}),
        );
        assert!(outcome.passed);
        assert!(outcome.warnings[0].contains("order_id"));
    }

    #[test]
    fn test_anonymous_lead_only_warns() {
        let outcome = check(LeadContactRule, json!({"event_name": "Lead", "properties": {}}));
        assert!(outcome.passed);
        assert!(outcome.warnings[0].contains("neither email nor phone"));
    }

    #[test]
    fn test_rules_only_fire_for_their_events() {
        let stage = BusinessRulesStage::new();
        let raw = json!({"event_name": "PageView", "properties": {}});
        let outcome = stage.apply(&PipelineState::new(&raw)).unwrap();
        assert!(outcome.passed);
        assert!(outcome.warnings.is_empty());
        assert!(outcome.errors.is_empty());
    }
}
