//! The stage orchestrator.
//!
//! Runs the fixed stage sequence over one event, threading the accumulating
//! standardized snapshot. Never short-circuits on a stage failure; warnings
//! and errors accumulate across all stages.

pub mod scoring;
pub mod stages;

use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::domain::{StageName, ValidationMetadata, ValidationResult};
use crate::observability::metrics::validation as validation_metrics;
use crate::observability::timing::{TimingSample, TimingSink};
use crate::pipeline::stats::{PipelineStats, StatsSnapshot};
use stages::{PipelineState, ValidationStage};

pub struct ValidationPipeline {
    config: PipelineConfig,
    stages: Vec<Box<dyn ValidationStage>>,
    stats: Arc<PipelineStats>,
    timing: Option<Box<dyn TimingSink>>,
}

impl ValidationPipeline {
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    pub fn with_config(config: PipelineConfig) -> Self {
        let stages = stages::default_stages(&config);
        Self {
            config,
            stages,
            stats: Arc::new(PipelineStats::new()),
            timing: None,
        }
    }

    /// Use a shared statistics accumulator instead of a private one.
    pub fn with_stats(mut self, stats: Arc<PipelineStats>) -> Self {
        self.stats = stats;
        self
    }

    /// Attach an observability hook invoked once per call.
    pub fn with_timing_sink(mut self, sink: Box<dyn TimingSink>) -> Self {
        self.timing = Some(sink);
        self
    }

    pub fn stats_handle(&self) -> Arc<PipelineStats> {
        Arc::clone(&self.stats)
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.stats.reset()
    }

    /// Validate one raw event. Never panics and never returns an error; the
    /// worst possible input yields a degraded zero-score result.
    pub fn validate(&self, input: &Value) -> ValidationResult {
        let started = Instant::now();

        if !input.is_object() {
            return self.reject_malformed(input, started);
        }

        let mut state = PipelineState::new(input);
        let mut warnings = Vec::new();
        let mut errors = Vec::new();
        let mut stages_run = Vec::with_capacity(self.stages.len());

        for stage in &self.stages {
            let stage_name = stage.name();
            debug!(stage = %stage_name, "running validation stage");

            match stage.apply(&state) {
                Ok(outcome) => {
                    warnings.extend(outcome.warnings);
                    errors.extend(outcome.errors);
                    if let Some(transformed) = outcome.transformed {
                        if stage_name == StageName::Standardization {
                            validation_metrics::legacy_migration();
                        }
                        state.snapshot = transformed;
                    }
                }
                Err(fault) => {
                    validation_metrics::stage_error(stage_name.as_str());
                    errors.push(format!("{} stage failed: {}", stage_name, fault));
                }
            }
            stages_run.push(stage_name);
        }

        let evaluation = scoring::evaluate(&state.snapshot, &warnings, &errors, &self.config);
        let result = ValidationResult {
            is_valid: errors.is_empty(),
            quality_score: evaluation.quality_score,
            warnings,
            errors,
            standardized_data: state.snapshot,
            metadata: ValidationMetadata {
                stages: stages_run,
                ad_platform_ready: evaluation.ad_platform_ready,
                privacy_compliant: evaluation.privacy_compliant,
                data_completeness: evaluation.data_completeness,
            },
        };

        self.stats.record(&result);
        self.record_metrics(&result);
        self.emit_timing(&result, started);
        result
    }

    fn reject_malformed(&self, input: &Value, started: Instant) -> ValidationResult {
        warn!("rejecting non-object event payload");

        let result = ValidationResult {
            is_valid: false,
            quality_score: 0,
            warnings: Vec::new(),
            errors: vec!["Event payload must be a JSON object".to_string()],
            standardized_data: PipelineState::new(input).snapshot,
            metadata: ValidationMetadata {
                stages: Vec::new(),
                ad_platform_ready: false,
                privacy_compliant: false,
                data_completeness: 0,
            },
        };

        self.stats.record_rejected();
        validation_metrics::record_rejected();
        self.emit_timing(&result, started);
        result
    }

    fn record_metrics(&self, result: &ValidationResult) {
        validation_metrics::record_processed();
        if result.is_valid {
            validation_metrics::record_passed();
        } else {
            validation_metrics::record_failed();
        }
        if !result.warnings.is_empty() {
            validation_metrics::warnings_recorded(result.warnings.len());
        }
        validation_metrics::score_recorded(result.quality_score);
        validation_metrics::completeness_recorded(result.metadata.data_completeness);
        if result.metadata.ad_platform_ready {
            validation_metrics::ad_platform_ready();
        }
        if result.metadata.privacy_compliant {
            validation_metrics::privacy_compliant();
        }
    }

    fn emit_timing(&self, result: &ValidationResult, started: Instant) {
        if let Some(sink) = &self.timing {
            sink.record(&TimingSample {
                operation: "validate_event".to_string(),
                duration: started.elapsed(),
                memory_delta: None,
                metadata: json!({
                    "event_name": result.standardized_data.event_name,
                    "is_valid": result.is_valid,
                    "quality_score": result.quality_score,
                }),
            });
        }
        validation_metrics::duration_recorded(started.elapsed().as_secs_f64());
    }
}

impl Default for ValidationPipeline {
    fn default() -> Self {
        Self::new()
    }
}
