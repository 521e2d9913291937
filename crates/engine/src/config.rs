//! Engine configuration management.
//!
//! An [`EngineConfig`] is injected into [`crate::QueryEngine`]; every field has
//! a default, so a partial YAML file overrides only what it names.

use crate::vocabulary::Vocabulary;
use samarth_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Defaults consulted when a question leaves a parameter unspecified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSettings {
    /// Window length for comparisons and policy questions
    #[serde(default = "default_last_n_years")]
    pub default_last_n_years: usize,

    /// Number of crops listed per state in comparisons
    #[serde(default = "default_top_m")]
    pub default_top_m: usize,

    /// States listed by a state ranking when the question gives no "top N"
    #[serde(default = "default_state_ranking_top_n")]
    pub state_ranking_top_n: usize,

    /// Window length for trend questions
    #[serde(default = "default_trend_window_years")]
    pub trend_window_years: usize,

    /// Window length for the general fallback
    #[serde(default = "default_general_window_years")]
    pub general_window_years: usize,

    /// Overlapping years required before a correlation is reported
    #[serde(default = "default_min_correlation_points")]
    pub min_correlation_points: usize,

    /// |r| below this is reported as no clear relationship
    #[serde(default = "default_correlation_threshold")]
    pub correlation_threshold: f64,
}

fn default_last_n_years() -> usize {
    5
}

fn default_top_m() -> usize {
    3
}

fn default_state_ranking_top_n() -> usize {
    5
}

fn default_trend_window_years() -> usize {
    10
}

fn default_general_window_years() -> usize {
    3
}

fn default_min_correlation_points() -> usize {
    3
}

fn default_correlation_threshold() -> f64 {
    0.3
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            default_last_n_years: default_last_n_years(),
            default_top_m: default_top_m(),
            state_ranking_top_n: default_state_ranking_top_n(),
            trend_window_years: default_trend_window_years(),
            general_window_years: default_general_window_years(),
            min_correlation_points: default_min_correlation_points(),
            correlation_threshold: default_correlation_threshold(),
        }
    }
}

/// Everything the engine needs besides the question and the data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub settings: AnalysisSettings,

    #[serde(default)]
    pub vocabulary: Vocabulary,
}

impl EngineConfig {
    /// Reject settings no analysis can work with.
    pub fn validate(&self) -> AppResult<()> {
        let s = &self.settings;
        for (name, value) in [
            ("defaultLastNYears", s.default_last_n_years),
            ("defaultTopM", s.default_top_m),
            ("stateRankingTopN", s.state_ranking_top_n),
            ("trendWindowYears", s.trend_window_years),
            ("generalWindowYears", s.general_window_years),
        ] {
            if value == 0 {
                return Err(AppError::Engine(format!("{} must be at least 1", name)));
            }
        }
        if s.min_correlation_points < 2 {
            return Err(AppError::Engine(
                "minCorrelationPoints must be at least 2".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&s.correlation_threshold) {
            return Err(AppError::Engine(format!(
                "correlationThreshold must be within 0..=1, got {}",
                s.correlation_threshold
            )));
        }
        if self.vocabulary.states.is_empty() {
            return Err(AppError::Engine("vocabulary.states must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Load engine configuration.
///
/// Reads `path` if it exists, otherwise returns the built-in defaults.
pub fn load_config(path: &Path) -> AppResult<EngineConfig> {
    let config = if path.exists() {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Engine(format!("Failed to read engine config at {:?}: {}", path, e))
        })?;

        let config: EngineConfig = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Engine(format!("Failed to parse engine config at {:?}: {}", path, e))
        })?;

        tracing::debug!("Loaded engine config from {:?}", path);
        config
    } else {
        tracing::debug!("Using default engine config (no file at {:?})", path);
        EngineConfig::default()
    };

    let config = EngineConfig {
        vocabulary: config.vocabulary.normalized(),
        ..config
    };
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_default_config() {
        let temp = TempDir::new().unwrap();
        let config = load_config(&temp.path().join("engine.yaml")).unwrap();

        assert_eq!(config.settings.default_last_n_years, 5);
        assert_eq!(config.settings.default_top_m, 3);
        assert_eq!(config.settings.state_ranking_top_n, 5);
        assert!(config.vocabulary.state_aliases.len() >= 50);
    }

    #[test]
    fn test_partial_file_overrides_only_named_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("engine.yaml");
        fs::write(
            &path,
            "settings:\n  defaultTopM: 5\nvocabulary:\n  districts: [Cuttack]\n  unknownKey: 1\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.settings.default_top_m, 5);
        assert_eq!(config.settings.trend_window_years, 10);
        assert_eq!(config.vocabulary.districts, vec!["Cuttack"]);
        assert!(config.vocabulary.state_aliases.len() >= 50);
    }

    #[test]
    fn test_serialized_config_loads_back() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("engine.yaml");
        let mut config = EngineConfig::default();
        config.settings.trend_window_years = 7;
        config
            .vocabulary
            .state_aliases
            .insert("Bombay State".to_string(), "Maharashtra".to_string());

        fs::write(&path, serde_yaml::to_string(&config).unwrap()).unwrap();

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.settings.trend_window_years, 7);
        assert_eq!(loaded.vocabulary.canonical_state("BOMBAY STATE"), "Maharashtra");
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("engine.yaml");
        fs::write(&path, "settings:\n  defaultTopM: 0\n").unwrap();

        let result = load_config(&path);
        assert!(matches!(result, Err(AppError::Engine(_))));
    }
}
