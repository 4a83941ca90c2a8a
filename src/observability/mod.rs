// Observability: metrics, logging, and timing hooks

pub mod logging;
pub mod metrics;
pub mod timing;

// Re-export main functions for ease of use
pub use logging::init_logging;
pub use timing::{LogTimingSink, TimingSample, TimingSink};
