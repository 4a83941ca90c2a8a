use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use crate::domain::ValidationResult;

#[derive(Debug, Default)]
struct StatsInner {
    processed: u64,
    passed: u64,
    warnings: u64,
    errors: u64,
    quality_scores: Vec<u8>,
}

/// Counters and score history across validation calls.
///
/// Explicitly constructed and injectable; share one instance across threads
/// via `Arc`. Increments are serialized by the inner mutex.
#[derive(Debug, Default)]
pub struct PipelineStats {
    inner: Mutex<StatsInner>,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StatsInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record one completed validation call.
    pub fn record(&self, result: &ValidationResult) {
        let mut inner = self.lock();
        inner.processed += 1;
        if result.is_valid {
            inner.passed += 1;
        } else {
            inner.errors += 1;
        }
        if !result.warnings.is_empty() {
            inner.warnings += 1;
        }
        inner.quality_scores.push(result.quality_score);
    }

    /// Record a call whose payload never made it into the stages. Only the
    /// processed and error counters move; the score history stays clean of
    /// synthetic zeros.
    pub fn record_rejected(&self) {
        let mut inner = self.lock();
        inner.processed += 1;
        inner.errors += 1;
    }

    /// Non-destructive snapshot with derived aggregates.
    pub fn snapshot(&self) -> StatsSnapshot {
        let inner = self.lock();
        let average_quality = if inner.quality_scores.is_empty() {
            0.0
        } else {
            inner.quality_scores.iter().map(|s| *s as f64).sum::<f64>()
                / inner.quality_scores.len() as f64
        };
        let success_rate = if inner.processed == 0 {
            0.0
        } else {
            inner.passed as f64 / inner.processed as f64 * 100.0
        };

        StatsSnapshot {
            processed: inner.processed,
            passed: inner.passed,
            warnings: inner.warnings,
            errors: inner.errors,
            quality_scores: inner.quality_scores.clone(),
            average_quality,
            success_rate,
        }
    }

    pub fn reset(&self) {
        *self.lock() = StatsInner::default();
    }
}

/// Point-in-time view of the accumulator.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub processed: u64,
    pub passed: u64,
    pub warnings: u64,
    pub errors: u64,
    pub quality_scores: Vec<u8>,
    pub average_quality: f64,
    pub success_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EventSnapshot, ValidationMetadata, ValidationResult};
    use serde_json::json;
    use std::sync::Arc;

    fn result(is_valid: bool, warnings: Vec<String>, score: u8) -> ValidationResult {
        ValidationResult {
            is_valid,
            quality_score: score,
            warnings,
            errors: if is_valid { vec![] } else { vec!["boom".to_string()] },
            standardized_data: EventSnapshot::lenient(&json!({"event_name": "PageView"})),
            metadata: ValidationMetadata {
                stages: vec![],
                ad_platform_ready: false,
                privacy_compliant: false,
                data_completeness: 100,
            },
        }
    }

    #[test]
    fn test_counters_follow_results() {
        let stats = PipelineStats::new();
        stats.record(&result(true, vec![], 100));
        stats.record(&result(true, vec!["w".to_string()], 95));
        stats.record(&result(false, vec![], 40));

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.processed, 3);
        assert_eq!(snapshot.passed, 2);
        assert_eq!(snapshot.errors, 1);
        assert_eq!(snapshot.warnings, 1);
        assert_eq!(snapshot.quality_scores, vec![100, 95, 40]);
        assert!((snapshot.success_rate - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_rejected_calls_touch_only_processed_and_errors() {
        let stats = PipelineStats::new();
        stats.record_rejected();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.processed, 1);
        assert_eq!(snapshot.errors, 1);
        assert_eq!(snapshot.passed, 0);
        assert_eq!(snapshot.warnings, 0);
        assert!(snapshot.quality_scores.is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let stats = PipelineStats::new();
        stats.record(&result(true, vec![], 90));
        stats.reset();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.processed, 0);
        assert!(snapshot.quality_scores.is_empty());
        assert_eq!(snapshot.average_quality, 0.0);
    }

    #[test]
    fn test_shared_across_threads() {
        let stats = Arc::new(PipelineStats::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        stats.record(&result(true, vec![], 90));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.snapshot().processed, 100);
    }
}
