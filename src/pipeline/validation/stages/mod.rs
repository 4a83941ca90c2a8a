// Stage trait, pipeline state, and the fixed stage sequence
pub mod patterns;

pub mod ad_platform;
pub mod business_rules;
pub mod data_types;
pub mod privacy;
pub mod standardize;
pub mod structure;

pub use ad_platform::AdPlatformStage;
pub use business_rules::BusinessRulesStage;
pub use data_types::DataTypesStage;
pub use privacy::PrivacyStage;
pub use standardize::StandardizationStage;
pub use structure::StructureStage;

use anyhow::Result;
use serde_json::Value;

use crate::config::PipelineConfig;
use crate::domain::{EventSnapshot, StageName, StageOutcome};

/// What a stage gets to look at: the untouched raw payload and the snapshot
/// as transformed by every stage before it.
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub raw: Value,
    pub snapshot: EventSnapshot,
}

impl PipelineState {
    pub fn new(raw: &Value) -> Self {
        Self {
            raw: raw.clone(),
            snapshot: EventSnapshot::lenient(raw),
        }
    }
}

/// One step of the validation sequence.
///
/// Stages inspect the state and report findings; they never mutate shared
/// data. A returned `Err` is a stage-internal fault, which the orchestrator
/// converts into a stage error and keeps going.
pub trait ValidationStage: Send + Sync {
    fn name(&self) -> StageName;

    fn apply(&self, state: &PipelineState) -> Result<StageOutcome>;
}

/// The fixed stage sequence, in execution order.
pub fn default_stages(config: &PipelineConfig) -> Vec<Box<dyn ValidationStage>> {
    vec![
        Box::new(StructureStage::new(config.known_platforms.clone())),
        Box::new(StandardizationStage),
        Box::new(DataTypesStage),
        Box::new(BusinessRulesStage::new()),
        Box::new(AdPlatformStage),
        Box::new(PrivacyStage),
    ]
}
