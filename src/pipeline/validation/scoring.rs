//! Post-stage evaluation: quality score, completeness, and the two
//! forwarding predicates.
//!
//! Scoring is additive: each finding carries a fixed cost, and any score can
//! be reconstructed from the warning and error lists.

use crate::config::{PipelineConfig, ScoringConfig};
use crate::domain::EventSnapshot;
use crate::pipeline::validation::stages::{ad_platform, privacy};
use crate::taxonomy;

/// Everything the scorer derives from the finished snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Evaluation {
    pub quality_score: u8,
    pub data_completeness: u8,
    pub ad_platform_ready: bool,
    pub privacy_compliant: bool,
}

pub fn evaluate(
    snapshot: &EventSnapshot,
    warnings: &[String],
    errors: &[String],
    config: &PipelineConfig,
) -> Evaluation {
    let canonical = taxonomy::definition(&snapshot.event_name).is_some();
    let ad_platform_ready = ad_platform::is_ready(snapshot);
    let privacy_compliant = privacy::is_compliant(snapshot);

    Evaluation {
        quality_score: quality_score(
            errors.len(),
            warnings.len(),
            canonical,
            ad_platform_ready,
            privacy_compliant,
            &config.scoring,
        ),
        data_completeness: completeness(snapshot, config),
        ad_platform_ready,
        privacy_compliant,
    }
}

pub fn quality_score(
    error_count: usize,
    warning_count: usize,
    canonical: bool,
    ad_platform_ready: bool,
    privacy_compliant: bool,
    weights: &ScoringConfig,
) -> u8 {
    let mut score: i64 = 100;
    score -= error_count as i64 * weights.error_penalty as i64;
    score -= warning_count as i64 * weights.warning_penalty as i64;
    if !canonical {
        score -= weights.non_canonical_penalty as i64;
    }
    if ad_platform_ready {
        score += weights.readiness_bonus as i64;
    }
    if privacy_compliant {
        score += weights.compliance_bonus as i64;
    }
    score.clamp(0, 100) as u8
}

/// Share of the canonical definition's required properties actually present.
/// Events outside the taxonomy get a fixed middle-of-the-road credit.
pub fn completeness(snapshot: &EventSnapshot, config: &PipelineConfig) -> u8 {
    match taxonomy::definition(&snapshot.event_name) {
        None => config.non_canonical_completeness,
        Some(def) if def.required_properties.is_empty() => 100,
        Some(def) => {
            let present = def
                .required_properties
                .iter()
                .filter(|prop| snapshot.has_field(prop))
                .count();
            ((present * 100) as f64 / def.required_properties.len() as f64).round() as u8
        }
    }
}
