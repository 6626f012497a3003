//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::models::{Category, WcsLevel};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Category weights for the Win Contribution Score.
///
/// The six category weights plus `win_bonus` are expected to sum to 1.0.
/// This is not enforced: a skewed table only skews the output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WcsWeights {
    pub battlefield: f64,
    pub combat: f64,
    pub firepower: f64,
    pub economy: f64,
    pub teamwork: f64,
    pub strategy: f64,
    pub win_bonus: f64,
}

impl Default for WcsWeights {
    fn default() -> Self {
        Self {
            battlefield: 0.29,
            combat: 0.18,
            firepower: 0.11,
            economy: 0.11,
            teamwork: 0.10,
            strategy: 0.06,
            win_bonus: 0.15,
        }
    }
}

impl WcsWeights {
    pub fn category(&self, category: Category) -> f64 {
        match category {
            Category::Battlefield => self.battlefield,
            Category::Combat => self.combat,
            Category::Economy => self.economy,
            Category::Teamwork => self.teamwork,
            Category::Strategy => self.strategy,
            Category::Firepower => self.firepower,
        }
    }

    pub fn sum(&self) -> f64 {
        Category::ALL
            .iter()
            .map(|&c| self.category(c))
            .sum::<f64>()
            + self.win_bonus
    }

    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() < 1e-9
    }
}

/// Minimum aggregate WCS for a level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelThreshold {
    pub min: f64,
    pub level: WcsLevel,
}

impl LevelThreshold {
    pub const fn new(min: f64, level: WcsLevel) -> Self {
        Self { min, level }
    }
}

/// Scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Number of most recent matches compared against the rest for the trend
    #[serde(default = "default_trend_window")]
    pub trend_window: usize,

    /// WCS difference needed before the trend leaves `steady`
    #[serde(default = "default_trend_margin")]
    pub trend_margin: f64,

    #[serde(default)]
    pub weights: WcsWeights,

    /// Level thresholds, highest first
    #[serde(default = "default_levels")]
    pub levels: Vec<LevelThreshold>,
}

fn default_levels() -> Vec<LevelThreshold> {
    vec![
        LevelThreshold::new(80.0, WcsLevel::Legendary),
        LevelThreshold::new(65.0, WcsLevel::Elite),
        LevelThreshold::new(50.0, WcsLevel::Good),
        LevelThreshold::new(35.0, WcsLevel::Average),
        LevelThreshold::new(20.0, WcsLevel::Below),
        LevelThreshold::new(0.0, WcsLevel::Poor),
    ]
}

fn default_trend_window() -> usize {
    3
}

fn default_trend_margin() -> f64 {
    3.0
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            trend_window: default_trend_window(),
            trend_margin: default_trend_margin(),
            weights: WcsWeights::default(),
            levels: default_levels(),
        }
    }
}

/// Batch collection limits used by the retrieval layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Number of valid matches to collect
    #[serde(default = "default_match_goal")]
    pub match_goal: usize,

    /// Matches with fewer participants are skipped
    #[serde(default = "default_min_players")]
    pub min_players: usize,

    /// Match details fetched in parallel per window
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Pause between windows
    #[serde(default = "default_batch_delay")]
    pub batch_delay_ms: u64,
}

fn default_match_goal() -> usize {
    12
}

fn default_min_players() -> usize {
    10
}

fn default_concurrency() -> usize {
    3
}

fn default_batch_delay() -> u64 {
    200
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            match_goal: default_match_goal(),
            min_players: default_min_players(),
            concurrency: default_concurrency(),
            batch_delay_ms: default_batch_delay(),
        }
    }
}

/// Match service endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Service queried directly first
    #[serde(default = "default_primary_base_url")]
    pub primary_base_url: String,

    /// Service reached through the proxy pool when the primary fails
    #[serde(default = "default_fallback_base_url")]
    pub fallback_base_url: String,

    /// Proxy URL templates; `{url}` is replaced by the encoded target URL
    #[serde(default = "default_proxies")]
    pub proxies: Vec<String>,

    /// Total proxy attempts before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_primary_base_url() -> String {
    "https://batrace.aoeiaol.top/api/v1".to_string()
}

fn default_fallback_base_url() -> String {
    "https://www.barmory.net".to_string()
}

fn default_proxies() -> Vec<String> {
    vec![
        "https://api.codetabs.com/v1/proxy?quest={url}".to_string(),
        "https://corsproxy.io/?{url}".to_string(),
        "https://api.allorigins.win/get?url={url}".to_string(),
    ]
}

fn default_max_attempts() -> u32 {
    5
}

fn default_timeout() -> u64 {
    30
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            primary_base_url: default_primary_base_url(),
            fallback_base_url: default_fallback_base_url(),
            proxies: default_proxies(),
            max_attempts: default_max_attempts(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub collection: CollectionConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let weights = &self.scoring.weights;
        let mut all_weights = Category::ALL
            .iter()
            .map(|&c| weights.category(c))
            .chain(std::iter::once(weights.win_bonus));
        if all_weights.any(|w| w < 0.0 || !w.is_finite()) {
            return Err(ConfigError::ValidationError(
                "WCS weights must be finite and non-negative".to_string(),
            ));
        }

        if !weights.is_normalized() {
            warn!(
                sum = weights.sum(),
                "WCS weights do not sum to 1.0; scores will be skewed"
            );
        }

        if self.scoring.levels.is_empty() {
            return Err(ConfigError::ValidationError(
                "At least one WCS level threshold is required".to_string(),
            ));
        }

        if self.collection.match_goal == 0 {
            return Err(ConfigError::ValidationError(
                "Match goal must be greater than 0".to_string(),
            ));
        }

        if self.collection.concurrency == 0 {
            return Err(ConfigError::ValidationError(
                "Collection concurrency must be greater than 0".to_string(),
            ));
        }

        if self.fetch.max_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "Fetch attempts must be greater than 0".to_string(),
            ));
        }

        if self.fetch.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Fetch timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.collection.match_goal, 12);
        assert_eq!(config.collection.min_players, 10);
        assert_eq!(config.collection.concurrency, 3);
        assert_eq!(config.fetch.max_attempts, 5);
        assert_eq!(config.fetch.proxies.len(), 3);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.scoring.trend_window, 3);
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = WcsWeights::default();
        assert!((weights.sum() - 1.0).abs() < 1e-9);
        assert!(weights.is_normalized());
    }

    #[test]
    fn test_default_levels_descending() {
        let levels = default_levels();
        assert_eq!(levels.len(), 6);
        assert!(levels.windows(2).all(|w| w[0].min > w[1].min));
        assert_eq!(levels[0].level, WcsLevel::Legendary);
        assert_eq!(levels[5].level, WcsLevel::Poor);
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unnormalized_weights_are_allowed() {
        let mut config = AppConfig::default();
        config.scoring.weights.battlefield = 0.5;

        assert!(!config.scoring.weights.is_normalized());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_negative_weight() {
        let mut config = AppConfig::default();
        config.scoring.weights.strategy = -0.1;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_collection() {
        let mut config = AppConfig::default();
        config.collection.concurrency = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.collection.match_goal = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_no_levels() {
        let mut config = AppConfig::default();
        config.scoring.levels.clear();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        // Should be parseable
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_partial_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[scoring.weights]
battlefield = 0.30
combat = 0.17
firepower = 0.11
economy = 0.11
teamwork = 0.10
strategy = 0.06
win_bonus = 0.15

[collection]
match_goal = 8

[server]
port = 9090
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.scoring.weights.battlefield, 0.30);
        assert_eq!(config.collection.match_goal, 8);
        assert_eq!(config.collection.min_players, 10);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.scoring.levels.len(), 6);
    }

    #[test]
    fn test_config_from_missing_file() {
        let result = AppConfig::from_file(Path::new("/nonexistent/wcs.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }
}
