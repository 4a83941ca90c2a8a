use std::time::Duration;

use serde_json::Value;
use tracing::debug;

/// One per-call observation handed to a timing sink.
#[derive(Debug, Clone)]
pub struct TimingSample {
    pub operation: String,
    pub duration: Duration,
    /// Heap delta for the call, when the host can measure it. The pipeline
    /// itself reports `None`; a caller with allocator instrumentation can
    /// wrap the sink and fill it in.
    pub memory_delta: Option<i64>,
    pub metadata: Value,
}

/// Optional per-call observability hook. Purely advisory: nothing a sink
/// does can change a validation outcome.
pub trait TimingSink: Send + Sync {
    fn record(&self, sample: &TimingSample);
}

/// Sink that forwards samples to the tracing subscriber at debug level.
pub struct LogTimingSink;

impl TimingSink for LogTimingSink {
    fn record(&self, sample: &TimingSample) {
        debug!(
            operation = %sample.operation,
            duration_us = sample.duration.as_micros() as u64,
            metadata = %sample.metadata,
            "timing sample"
        );
    }
}
