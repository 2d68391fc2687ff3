//! Runtime configuration.
//!
//! Every field has a default, so an empty JSON object is a complete config.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::QueryFilters;
use crate::domain::search::{DEFAULT_MAX_RESULTS, DEFAULT_TOP_N, MAX_RESULTS_LIMIT, TOP_N_LIMIT};

/// Ten years. Longer windows are refused.
pub const MAX_RETENTION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub registry: RegistryConfig,
    pub pipeline: PipelineConfig,
    pub search: SearchDefaults,
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_RETENTION_SECS).contains(&self.registry.retention_secs) {
            return Err(ConfigError::Invalid(format!(
                "registry.retention_secs must be within 1..={MAX_RETENTION_SECS}"
            )));
        }
        if self.registry.reap_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "registry.reap_interval_secs must be > 0".into(),
            ));
        }
        if self.pipeline.fetch_batch_size == 0 {
            return Err(ConfigError::Invalid(
                "pipeline.fetch_batch_size must be > 0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.pipeline.relevance_threshold) {
            return Err(ConfigError::Invalid(format!(
                "pipeline.relevance_threshold must be within [0, 1], got {}",
                self.pipeline.relevance_threshold
            )));
        }
        if !(1..=MAX_RESULTS_LIMIT).contains(&self.search.default_max_results) {
            return Err(ConfigError::Invalid(format!(
                "search.default_max_results must be within 1..={MAX_RESULTS_LIMIT}"
            )));
        }
        if !(1..=TOP_N_LIMIT).contains(&self.search.default_top_n) {
            return Err(ConfigError::Invalid(format!(
                "search.default_top_n must be within 1..={TOP_N_LIMIT}"
            )));
        }
        Ok(())
    }
}

/// Task registry retention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Terminal tasks untouched for longer than this are evicted.
    pub retention_secs: u64,

    /// How often the reaper sweeps.
    pub reap_interval_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            retention_secs: 60 * 60,
            reap_interval_secs: 5 * 60,
        }
    }
}

impl RegistryConfig {
    /// Saturates at [`MAX_RETENTION_SECS`] for configs that skipped `validate`.
    pub fn retention(&self) -> chrono::Duration {
        let secs = self.retention_secs.min(MAX_RETENTION_SECS);
        i64::try_from(secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub fn reap_interval(&self) -> Duration {
        Duration::from_secs(self.reap_interval_secs)
    }
}

/// Search pipeline tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Ids per metadata-fetch call.
    pub fetch_batch_size: usize,

    /// Applied when a scorer omits the boolean relevance flag.
    pub relevance_threshold: f64,

    pub exclude_reviews: bool,
    pub free_full_text_only: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_batch_size: 200,
            relevance_threshold: 0.5,
            exclude_reviews: true,
            free_full_text_only: true,
        }
    }
}

impl PipelineConfig {
    pub fn filters(&self) -> QueryFilters {
        QueryFilters {
            exclude_reviews: self.exclude_reviews,
            free_full_text_only: self.free_full_text_only,
        }
    }
}

/// Defaults for parameters a client leaves out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchDefaults {
    pub default_max_results: usize,
    pub default_top_n: usize,
}

impl Default for SearchDefaults {
    fn default() -> Self {
        Self {
            default_max_results: DEFAULT_MAX_RESULTS,
            default_top_n: DEFAULT_TOP_N,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn empty_object_is_default() {
        let config = AppConfig::from_json_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.registry.retention(), chrono::Duration::hours(1));
        assert_eq!(config.registry.reap_interval(), Duration::from_secs(300));
        assert_eq!(config.pipeline.fetch_batch_size, 200);
        assert_eq!(config.pipeline.relevance_threshold, 0.5);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config =
            AppConfig::from_json_str(r#"{"registry": {"retention_secs": 60}}"#).unwrap();
        assert_eq!(config.registry.retention_secs, 60);
        assert_eq!(config.registry.reap_interval_secs, 300);
        assert!(config.pipeline.filters().exclude_reviews);
    }

    #[rstest]
    #[case::zero_retention(r#"{"registry": {"retention_secs": 0}}"#)]
    #[case::huge_retention(r#"{"registry": {"retention_secs": 100000000000000000}}"#)]
    #[case::u64_max_retention(r#"{"registry": {"retention_secs": 18446744073709551615}}"#)]
    #[case::zero_interval(r#"{"registry": {"reap_interval_secs": 0}}"#)]
    #[case::zero_batch(r#"{"pipeline": {"fetch_batch_size": 0}}"#)]
    #[case::threshold(r#"{"pipeline": {"relevance_threshold": 1.5}}"#)]
    #[case::top_n(r#"{"search": {"default_top_n": 500}}"#)]
    fn rejects_invalid_values(#[case] json: &str) {
        assert!(matches!(
            AppConfig::from_json_str(json),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn longest_retention_is_accepted() {
        let json = format!(r#"{{"registry": {{"retention_secs": {MAX_RETENTION_SECS}}}}}"#);
        let config = AppConfig::from_json_str(&json).unwrap();
        assert_eq!(config.registry.retention(), chrono::Duration::days(3650));
    }

    #[rstest]
    #[case(MAX_RETENTION_SECS + 1)]
    #[case(u64::MAX)]
    fn unvalidated_retention_saturates(#[case] retention_secs: u64) {
        let registry = RegistryConfig {
            retention_secs,
            ..RegistryConfig::default()
        };
        assert_eq!(registry.retention(), chrono::Duration::days(3650));
    }

    #[test]
    fn parse_error_is_reported() {
        assert!(matches!(
            AppConfig::from_json_str("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = AppConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
