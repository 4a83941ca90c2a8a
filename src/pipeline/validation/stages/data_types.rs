use anyhow::Result;
use serde_json::{Number, Value};

use super::patterns;
use super::{PipelineState, ValidationStage};
use crate::domain::{StageName, StageOutcome};

/// Property fields that carry identifiers and are normalized to strings
const IDENTIFIER_FIELDS: &[&str] = &["product_id", "content_id", "order_id", "transaction_id"];

/// Scalar normalization without hard failure.
///
/// Coerces what can be coerced safely, warns about the rest, and never zeroes
/// out a value it cannot read. Emits a transform only when a field actually
/// changed.
pub struct DataTypesStage;

impl ValidationStage for DataTypesStage {
    fn name(&self) -> StageName {
        StageName::DataTypes
    }

    fn apply(&self, state: &PipelineState) -> Result<StageOutcome> {
        let mut outcome = StageOutcome::passing(self.name());
        let mut work = state.snapshot.clone();
        let mut changed = false;

        match work.properties.get("value").cloned() {
            Some(Value::Number(_)) | None => {}
            Some(Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(parsed) => {
                    if let Some(number) = Number::from_f64(parsed) {
                        work.properties
                            .insert("value".to_string(), Value::Number(number));
                        changed = true;
                    }
                }
                Err(_) => outcome.warn(format!("value is not numeric: {}", s)),
            },
            Some(other) => outcome.warn(format!("value is not numeric: {}", other)),
        }

        if let Some(currency) = work.properties.get("currency") {
            if !currency.is_string() {
                outcome.warn(format!("currency should be a string: {}", currency));
            }
        }

        for field in IDENTIFIER_FIELDS {
            let coerced = match work.properties.get(*field) {
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            };
            if let Some(as_string) = coerced {
                work.properties
                    .insert(field.to_string(), Value::String(as_string));
                changed = true;
            }
        }

        // Already-hashed identifiers are exempt from format checks so that
        // re-validating standardized output stays quiet.
        if let Some(email) = work.properties.get("email").and_then(|v| v.as_str()) {
            if !patterns::is_hash_shaped(email) && !patterns::is_valid_email(email) {
                outcome.warn(format!("email format looks invalid: {}", email));
            }
        }

        if let Some(phone) = work.properties.get("phone").and_then(|v| v.as_str()) {
            if !patterns::is_hash_shaped(phone) && !patterns::is_valid_phone(phone) {
                outcome.warn(format!("phone format looks invalid: {}", phone));
            }
        }

        if changed {
            outcome.set_transform(work);
        }

        Ok(outcome)
    }
}
