//! Aggregation settings, loaded from `.gitinsights.toml` or an explicit file.

use crate::error::{InsightsError, Result};
use crate::model::Period;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = ".gitinsights.toml";

pub const DEFAULT_ACTIVE_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_CORE_CONTRIBUTOR_SHARE: f64 = 0.1;
pub const DEFAULT_CONCENTRATION_TOP: usize = 5;
pub const DEFAULT_CONCENTRATED_THRESHOLD: f64 = 0.8;

pub const DEFAULT_MIN_ACTIVE_RATIO: f64 = 0.5;
pub const DEFAULT_DECLINE_MARGIN: f64 = 0.25;
pub const DEFAULT_MIN_DAILY_COMMITS: f64 = 0.5;
pub const DEFAULT_MIN_CONTRIBUTORS: u64 = 3;
pub const DEFAULT_LARGE_FILE_LINES: u64 = 1000;

/// Settings passed explicitly into [`crate::insights::aggregate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightsConfig {
    /// Bucket width of the trend series.
    pub period: Period,
    /// Keep only the first N ranked contributors. `None` keeps all.
    pub top_n: Option<usize>,
    /// Trailing window, ending at the latest commit, that makes a contributor active.
    pub active_window_days: i64,
    /// Share of all commits above which a contributor counts as core.
    pub core_contributor_share: f64,
    /// Number of leading contributors summed for the concentration figure.
    pub concentration_top: usize,
    /// Concentration above which contributions are reported as concentrated.
    pub concentrated_threshold: f64,
    /// Extra extension to language mappings, e.g. `vue = "Vue"`.
    pub languages: BTreeMap<String, String>,
    pub recommendations: RecommendationThresholds,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            period: Period::default(),
            top_n: None,
            active_window_days: DEFAULT_ACTIVE_WINDOW_DAYS,
            core_contributor_share: DEFAULT_CORE_CONTRIBUTOR_SHARE,
            concentration_top: DEFAULT_CONCENTRATION_TOP,
            concentrated_threshold: DEFAULT_CONCENTRATED_THRESHOLD,
            languages: BTreeMap::new(),
            recommendations: RecommendationThresholds::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    /// Active/total contributor ratio below which a diversity note is raised.
    pub min_active_ratio: f64,
    /// Fractional drop of the last third of the trend versus the first third.
    pub decline_margin: f64,
    pub min_daily_commits: f64,
    pub min_contributors: u64,
    /// Files at HEAD with more lines than this are flagged for refactoring.
    pub large_file_lines: u64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            min_active_ratio: DEFAULT_MIN_ACTIVE_RATIO,
            decline_margin: DEFAULT_DECLINE_MARGIN,
            min_daily_commits: DEFAULT_MIN_DAILY_COMMITS,
            min_contributors: DEFAULT_MIN_CONTRIBUTORS,
            large_file_lines: DEFAULT_LARGE_FILE_LINES,
        }
    }
}

impl InsightsConfig {
    /// Load from an explicit path. A missing file is an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InsightsError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Load `<dir>/.gitinsights.toml`, or the defaults when it does not exist.
    pub fn load_default(dir: impl AsRef<Path>) -> Result<Self> {
        let path = dir.as_ref().join(CONFIG_FILE_NAME);
        if path.is_file() {
            tracing::debug!("loading config from {}", path.display());
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let mut table: toml::Table = toml::from_str(text)?;

        // Same parser and error kind as `--period`
        let period = match table.remove("period") {
            Some(toml::Value::String(s)) => Some(s.parse::<Period>()?),
            Some(other) => {
                return Err(InsightsError::config(format!(
                    "period must be a string, got {}",
                    other.type_str()
                )))
            }
            None => None,
        };

        let mut config: Self = toml::Value::Table(table).try_into()?;
        if let Some(period) = period {
            config.period = period;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.active_window_days < 0 {
            return Err(InsightsError::config(format!(
                "active_window_days must not be negative, got {}",
                self.active_window_days
            )));
        }
        if self.top_n == Some(0) {
            return Err(InsightsError::config("top_n must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = InsightsConfig::from_toml("").unwrap();
        assert_eq!(config, InsightsConfig::default());
        assert_eq!(config.active_window_days, 30);
        assert_eq!(config.top_n, None);
    }

    #[test]
    fn partial_toml_overrides_fields() {
        let config = InsightsConfig::from_toml(
            r#"
            period = "week"
            top_n = 10

            [languages]
            vue = "Vue"

            [recommendations]
            decline_margin = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.period, Period::Week);
        assert_eq!(config.top_n, Some(10));
        assert_eq!(config.languages.get("vue").map(String::as_str), Some("Vue"));
        assert_eq!(config.recommendations.decline_margin, 0.5);
        assert_eq!(config.recommendations.min_active_ratio, DEFAULT_MIN_ACTIVE_RATIO);
    }

    #[test]
    fn unknown_period_is_configuration_error() {
        let err = InsightsConfig::from_toml(r#"period = "fortnight""#).unwrap_err();
        assert!(matches!(err, InsightsError::Configuration(_)), "got {err:?}");

        let err = InsightsConfig::from_toml("period = 7").unwrap_err();
        assert!(matches!(err, InsightsError::Configuration(_)), "got {err:?}");
    }

    #[test]
    fn period_accepts_same_spellings_as_cli() {
        let config = InsightsConfig::from_toml(r#"period = "Weekly""#).unwrap();
        assert_eq!(config.period, Period::Week);
        assert_eq!(config.period, "weekly".parse::<Period>().unwrap());
    }

    #[test]
    fn period_deserializes_through_from_str() {
        let period: Period = serde_json::from_str(r#""daily""#).unwrap();
        assert_eq!(period, Period::Day);
        assert!(serde_json::from_str::<Period>(r#""fortnight""#).is_err());
    }

    #[test]
    fn large_file_threshold_is_configurable() {
        let config = InsightsConfig::from_toml("[recommendations]\nlarge_file_lines = 400").unwrap();
        assert_eq!(config.recommendations.large_file_lines, 400);
        assert_eq!(
            InsightsConfig::default().recommendations.large_file_lines,
            DEFAULT_LARGE_FILE_LINES
        );
    }

    #[test]
    fn missing_explicit_file_is_configuration_error() {
        let err = InsightsConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, InsightsError::Configuration(_)));
    }

    #[test]
    fn missing_default_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = InsightsConfig::load_default(dir.path()).unwrap();
        assert_eq!(config, InsightsConfig::default());
    }
}
