use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::GeoduelError;

pub const DEFAULT_COUNTRIES_URL: &str =
    "https://restcountries.com/v3.1/all?fields=name,population,flags,area,cca2,cca3";
pub const DEFAULT_GDP_URL: &str =
    "https://api.worldbank.org/v2/country/all/indicator/NY.GDP.MKTP.CD?format=json&date=2022&per_page=300";
pub const DEFAULT_SCORE_KEY_PREFIX: &str = "countryGameHighScore_";

/// TOML-backed game configuration. Every section and field is optional;
/// missing values fall back to the stock game settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    pub sources: SourcesConfig,
    pub filters: FilterConfig,
    pub timings: TimingsConfig,
    pub scores: ScoresConfig,
    pub rules: RulesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourcesConfig {
    pub countries_url: String,
    pub gdp_url: String,
    pub request_timeout_secs: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            countries_url: DEFAULT_COUNTRIES_URL.to_string(),
            gdp_url: DEFAULT_GDP_URL.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl SourcesConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Exclusive lower bound on population.
    pub min_population: u64,
    /// Exclusive lower bound on area, km².
    pub min_area: f64,
    /// USD per person used when the GDP source has no value for a country.
    pub gdp_per_capita_estimate: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_population: 100_000,
            min_area: 1_000.0,
            gdp_per_capita_estimate: 10_000.0,
        }
    }
}

/// Presentation pacing, in milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingsConfig {
    pub value_reveal_ms: u64,
    pub result_display_ms: u64,
    pub transition_ms: u64,
    pub loading_delay_ms: u64,
}

impl Default for TimingsConfig {
    fn default() -> Self {
        Self {
            value_reveal_ms: 1_200,
            result_display_ms: 1_000,
            transition_ms: 500,
            loading_delay_ms: 0,
        }
    }
}

impl TimingsConfig {
    pub fn value_reveal(&self) -> Duration {
        Duration::from_millis(self.value_reveal_ms)
    }

    pub fn result_display(&self) -> Duration {
        Duration::from_millis(self.result_display_ms)
    }

    pub fn transition(&self) -> Duration {
        Duration::from_millis(self.transition_ms)
    }

    pub fn loading_delay(&self) -> Duration {
        Duration::from_millis(self.loading_delay_ms)
    }

    /// All delays zeroed.
    pub fn instant() -> Self {
        Self {
            value_reveal_ms: 0,
            result_display_ms: 0,
            transition_ms: 0,
            loading_delay_ms: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoresConfig {
    pub key_prefix: String,
    /// JSON file standing in for browser local storage.
    pub store_path: PathBuf,
    /// Base URL of the remote score endpoint. Sync is off when unset.
    pub sync_url: Option<String>,
}

impl Default for ScoresConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_SCORE_KEY_PREFIX.to_string(),
            store_path: PathBuf::from("geoduel-scores.json"),
            sync_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    pub tie_policy: TiePolicy,
}

/// How a round resolves when both countries have the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TiePolicy {
    /// A tie is wrong for either guess.
    #[default]
    Loss,
    /// A tie is right for either guess.
    Win,
}

impl FromStr for TiePolicy {
    type Err = GeoduelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "loss" => Ok(TiePolicy::Loss),
            "win" => Ok(TiePolicy::Win),
            _ => Err(GeoduelError::UnknownTiePolicy(s.to_string())),
        }
    }
}

impl fmt::Display for TiePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TiePolicy::Loss => f.write_str("loss"),
            TiePolicy::Win => f.write_str("win"),
        }
    }
}

impl GameConfig {
    /// Load from an optional TOML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => load_config(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// Apply `GEODUEL_*` overrides from `lookup`. Invalid values are logged and ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("GEODUEL_SCORE_SYNC_URL") {
            self.scores.sync_url = if url.trim().is_empty() { None } else { Some(url) };
        }
        if let Some(path) = lookup("GEODUEL_SCORE_FILE") {
            self.scores.store_path = PathBuf::from(path);
        }
        if let Some(raw) = lookup("GEODUEL_TIE_POLICY") {
            match raw.parse() {
                Ok(policy) => self.rules.tie_policy = policy,
                Err(e) => tracing::warn!(error = %e, "Ignoring GEODUEL_TIE_POLICY"),
            }
        }
    }

    /// Log the effective settings.
    pub fn log_summary(&self) {
        tracing::info!(
            countries_url = %self.sources.countries_url,
            gdp_url = %self.sources.gdp_url,
            min_population = self.filters.min_population,
            min_area = self.filters.min_area,
            tie_policy = %self.rules.tie_policy,
            score_file = %self.scores.store_path.display(),
            sync_enabled = self.scores.sync_url.is_some(),
            "Configuration loaded"
        );
    }
}

/// Load and parse a TOML config file.
pub fn load_config(path: &Path) -> Result<GameConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: GameConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn empty_toml_yields_stock_settings() {
        let config: GameConfig = toml::from_str("").unwrap();
        assert_eq!(config.filters.min_population, 100_000);
        assert_eq!(config.filters.min_area, 1_000.0);
        assert_eq!(config.filters.gdp_per_capita_estimate, 10_000.0);
        assert_eq!(config.timings.value_reveal_ms, 1_200);
        assert_eq!(config.timings.result_display_ms, 1_000);
        assert_eq!(config.timings.transition_ms, 500);
        assert_eq!(config.scores.key_prefix, "countryGameHighScore_");
        assert_eq!(config.rules.tie_policy, TiePolicy::Loss);
        assert!(config.scores.sync_url.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: GameConfig = toml::from_str(
            r#"
            [filters]
            min_population = 5000

            [rules]
            tie_policy = "win"
            "#,
        )
        .unwrap();
        assert_eq!(config.filters.min_population, 5_000);
        assert_eq!(config.filters.min_area, 1_000.0);
        assert_eq!(config.rules.tie_policy, TiePolicy::Win);
        assert_eq!(config.sources.gdp_url, DEFAULT_GDP_URL);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<GameConfig, _> = toml::from_str("[filters]\nmin_height = 3\n");
        assert!(result.is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("GEODUEL_SCORE_SYNC_URL", "https://scores.example.com"),
            ("GEODUEL_SCORE_FILE", "/tmp/scores.json"),
            ("GEODUEL_TIE_POLICY", "WIN"),
        ]);
        let mut config = GameConfig::default();
        config.apply_overrides(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.scores.sync_url.as_deref(), Some("https://scores.example.com"));
        assert_eq!(config.scores.store_path, PathBuf::from("/tmp/scores.json"));
        assert_eq!(config.rules.tie_policy, TiePolicy::Win);
    }

    #[test]
    fn invalid_tie_policy_override_is_ignored() {
        let mut config = GameConfig::default();
        config.apply_overrides(|k| (k == "GEODUEL_TIE_POLICY").then(|| "coin-flip".to_string()));
        assert_eq!(config.rules.tie_policy, TiePolicy::Loss);
    }

    #[test]
    fn blank_sync_url_disables_sync() {
        let mut config = GameConfig::default();
        config.scores.sync_url = Some("https://old.example.com".into());
        config.apply_overrides(|k| (k == "GEODUEL_SCORE_SYNC_URL").then(String::new));
        assert!(config.scores.sync_url.is_none());
    }

    #[test]
    fn load_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geoduel.toml");
        std::fs::write(&path, "[timings]\nvalue_reveal_ms = 10\n").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.timings.value_reveal(), Duration::from_millis(10));
        assert_eq!(config.timings.transition(), Duration::from_millis(500));
    }

    #[test]
    fn example_config_parses_to_defaults() {
        let config: GameConfig =
            toml::from_str(include_str!("../../../geoduel.example.toml")).unwrap();
        assert_eq!(config.sources.countries_url, DEFAULT_COUNTRIES_URL);
        assert_eq!(config.sources.gdp_url, DEFAULT_GDP_URL);
        assert_eq!(config.timings.value_reveal_ms, 1_200);
        assert_eq!(config.rules.tie_policy, TiePolicy::Loss);
        assert!(config.scores.sync_url.is_none());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }
}
