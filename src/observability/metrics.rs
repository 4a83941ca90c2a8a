//! Metrics for the event validation pipeline.
//!
//! This module provides a straightforward API for recording metrics using
//! the standard Prometheus naming conventions.

use std::fmt;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Enum representing all metric names used in the system
/// This eliminates magic strings and provides compile-time safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    // Validation metrics
    ValidationProcessed,
    ValidationPassed,
    ValidationFailed,
    ValidationRejected,
    ValidationWarnings,
    ValidationDuration,
    StageErrors,

    // Standardization metrics
    LegacyMigrations,

    // Quality metrics
    QualityScore,
    DataCompleteness,
    AdPlatformReady,
    PrivacyCompliant,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            // Validation metrics
            MetricName::ValidationProcessed => "event_gate_validation_processed_total",
            MetricName::ValidationPassed => "event_gate_validation_passed_total",
            MetricName::ValidationFailed => "event_gate_validation_failed_total",
            MetricName::ValidationRejected => "event_gate_validation_rejected_total",
            MetricName::ValidationWarnings => "event_gate_validation_warnings_total",
            MetricName::ValidationDuration => "event_gate_validation_duration_seconds",
            MetricName::StageErrors => "event_gate_stage_errors_total",

            // Standardization metrics
            MetricName::LegacyMigrations => "event_gate_legacy_migrations_total",

            // Quality metrics
            MetricName::QualityScore => "event_gate_quality_score",
            MetricName::DataCompleteness => "event_gate_data_completeness",
            MetricName::AdPlatformReady => "event_gate_ad_platform_ready_total",
            MetricName::PrivacyCompliant => "event_gate_privacy_compliant_total",
        }
    }

    /// Get metric metadata for dashboard generation
    pub fn metadata(&self) -> (&'static str, &'static str, Option<&'static str>) {
        // Returns (phase, description, unit)
        match self {
            MetricName::ValidationProcessed => {
                ("validation", "Events processed by the pipeline", None)
            }
            MetricName::ValidationPassed => ("validation", "Events that passed validation", None),
            MetricName::ValidationFailed => {
                ("validation", "Events with at least one hard error", None)
            }
            MetricName::ValidationRejected => {
                ("validation", "Payloads rejected before any stage ran", None)
            }
            MetricName::ValidationWarnings => ("validation", "Warnings collected", None),
            MetricName::ValidationDuration => {
                ("validation", "Validation call duration", Some("s"))
            }
            MetricName::StageErrors => ("validation", "Stage-internal faults by stage", None),
            MetricName::LegacyMigrations => {
                ("standardization", "Legacy event names migrated", None)
            }
            MetricName::QualityScore => ("quality", "Quality score distribution", None),
            MetricName::DataCompleteness => {
                ("quality", "Required-property completeness distribution", None)
            }
            MetricName::AdPlatformReady => {
                ("quality", "Events ready for conversion forwarding", None)
            }
            MetricName::PrivacyCompliant => ("quality", "Privacy-compliant events", None),
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Initialize the metrics system and return the render handle.
pub fn init() -> Result<PrometheusHandle, Box<dyn std::error::Error>> {
    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {}", e))?;
    Ok(handle)
}

// ============================================================================
// Validation Metrics
// ============================================================================

pub mod validation {
    use super::MetricName;

    pub fn record_processed() {
        ::metrics::counter!(MetricName::ValidationProcessed.as_str()).increment(1);
    }

    pub fn record_passed() {
        ::metrics::counter!(MetricName::ValidationPassed.as_str()).increment(1);
    }

    pub fn record_failed() {
        ::metrics::counter!(MetricName::ValidationFailed.as_str()).increment(1);
    }

    /// Record a payload rejected before the stages could run
    pub fn record_rejected() {
        ::metrics::counter!(MetricName::ValidationRejected.as_str()).increment(1);
    }

    pub fn warnings_recorded(count: usize) {
        ::metrics::counter!(MetricName::ValidationWarnings.as_str()).increment(count as u64);
    }

    pub fn duration_recorded(secs: f64) {
        ::metrics::histogram!(MetricName::ValidationDuration.as_str()).record(secs);
    }

    /// Record a stage-internal fault
    pub fn stage_error(stage: &str) {
        ::metrics::counter!(MetricName::StageErrors.as_str(), "stage" => stage.to_string())
            .increment(1);
    }

    pub fn legacy_migration() {
        ::metrics::counter!(MetricName::LegacyMigrations.as_str()).increment(1);
    }

    pub fn score_recorded(score: u8) {
        ::metrics::histogram!(MetricName::QualityScore.as_str()).record(score as f64);
    }

    pub fn completeness_recorded(completeness: u8) {
        ::metrics::histogram!(MetricName::DataCompleteness.as_str()).record(completeness as f64);
    }

    pub fn ad_platform_ready() {
        ::metrics::counter!(MetricName::AdPlatformReady.as_str()).increment(1);
    }

    pub fn privacy_compliant() {
        ::metrics::counter!(MetricName::PrivacyCompliant.as_str()).increment(1);
    }
}
