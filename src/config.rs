use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{PipelineError, Result};

/// Tunables for the validation pipeline.
///
/// Defaults encode the published scoring contract; a deployment can override
/// them from a TOML file without recompiling.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub scoring: ScoringConfig,
    /// Platform identifiers the structure stage recognizes. Unknown values
    /// warn but never reject.
    pub known_platforms: Vec<String>,
    /// Completeness credit for events outside the canonical taxonomy
    pub non_canonical_completeness: u8,
}

/// Fixed per-finding costs and bonuses.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub error_penalty: u8,
    pub warning_penalty: u8,
    pub non_canonical_penalty: u8,
    pub readiness_bonus: u8,
    pub compliance_bonus: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            error_penalty: 20,
            warning_penalty: 5,
            non_canonical_penalty: 10,
            readiness_bonus: 5,
            compliance_bonus: 5,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            known_platforms: ["web", "ios", "android", "server", "mobile_web"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            non_canonical_completeness: 50,
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: PipelineConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_scoring_contract() {
        let config = PipelineConfig::default();
        assert_eq!(config.scoring.error_penalty, 20);
        assert_eq!(config.scoring.warning_penalty, 5);
        assert_eq!(config.scoring.non_canonical_penalty, 10);
        assert_eq!(config.non_canonical_completeness, 50);
        assert!(config.known_platforms.iter().any(|p| p == "web"));
    }

    #[test]
    fn test_partial_toml_overrides_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            "non_canonical_completeness = 40\n\n[scoring]\nwarning_penalty = 3"
        )
        .unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.non_canonical_completeness, 40);
        assert_eq!(config.scoring.warning_penalty, 3);
        assert_eq!(config.scoring.error_penalty, 20);
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let result = PipelineConfig::from_file("does/not/exist.toml");
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }
}
