pub mod config;
pub mod domain;
pub mod error;
pub mod observability;
pub mod pipeline;
pub mod taxonomy;

// Most callers only need the pipeline and its result types
pub use config::PipelineConfig;
pub use domain::{EventSnapshot, StageName, ValidationMetadata, ValidationResult};
pub use pipeline::stats::{PipelineStats, StatsSnapshot};
pub use pipeline::validation::ValidationPipeline;
