//! Application configuration.
//!
//! Loaded from config.json next to the executable at startup. Missing or
//! malformed files fall back to defaults. The backend base URL can be
//! overridden with the `LOTTO_API_BASE_URL` environment variable.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::prize::PrizeRank;

/// Environment variable that overrides `api.base_url`.
pub const BASE_URL_ENV: &str = "LOTTO_API_BASE_URL";

/// Backend connection settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the analysis backend, without trailing slash
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Corner selector display settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Width of the box the photo is fitted into
    pub display_width: f64,
    /// Height of the box the photo is fitted into
    pub display_height: f64,
    /// Grab radius around a corner, in original image pixels
    pub hit_radius: f64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            display_width: 800.0,
            display_height: 600.0,
            hit_radius: 50.0,
        }
    }
}

/// Prize amount credited per rank when computing winnings.
///
/// These are nominal figures, not live jackpot amounts.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PrizeTable {
    pub rank1: u64,
    pub rank2: u64,
    pub rank3: u64,
    pub rank4: u64,
    pub rank5: u64,
}

impl Default for PrizeTable {
    fn default() -> Self {
        Self {
            rank1: 2_000_000_000,
            rank2: 50_000_000,
            rank3: 1_500_000,
            rank4: 50_000,
            rank5: 5_000,
        }
    }
}

impl PrizeTable {
    /// Prize amount for a rank.
    pub fn amount(&self, rank: PrizeRank) -> u64 {
        match rank {
            PrizeRank::First => self.rank1,
            PrizeRank::Second => self.rank2,
            PrizeRank::Third => self.rank3,
            PrizeRank::Fourth => self.rank4,
            PrizeRank::Fifth => self.rank5,
        }
    }
}

/// Statistics behaviour switches.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// Count tickets whose draw result is unknown as "no win" instead of
    /// keeping them in their own bucket.
    pub count_undetermined_as_no_win: bool,
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub selector: SelectorConfig,
    pub prizes: PrizeTable,
    pub statistics: StatisticsConfig,
}

impl AppConfig {
    /// Loads config from `path`, or returns defaults if it is missing or invalid.
    /// The base URL environment override is applied in both cases.
    pub fn load(path: &Path) -> Self {
        let mut config = Self::read_file(path);
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            config.apply_base_url_override(&url);
        }
        config
    }

    fn read_file(path: &Path) -> Self {
        log::info!("Looking for config at: {}", path.display());

        if !path.exists() {
            log::info!("config.json not found. Using default config.");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("Config loaded from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse config.json: {}. Using defaults.", e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Failed to read config.json: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Replaces the backend base URL. Blank values are ignored.
    pub fn apply_base_url_override(&mut self, url: &str) {
        let url = url.trim().trim_end_matches('/');
        if url.is_empty() {
            return;
        }
        log::info!("Backend base URL overridden by {}: {}", BASE_URL_ENV, url);
        self.api.base_url = url.to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = AppConfig::read_file(Path::new("/definitely/not/here/config.json"));
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.selector.hit_radius, 50.0);
        assert_eq!(config.prizes.rank5, 5_000);
        assert!(!config.statistics.count_undetermined_as_no_win);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"api": {{"base_url": "http://backend:9000"}}, "prizes": {{"rank1": 1000}}}}"#
        )
        .unwrap();

        let config = AppConfig::read_file(file.path());
        assert_eq!(config.api.base_url, "http://backend:9000");
        assert_eq!(config.api.timeout_secs, 60);
        assert_eq!(config.prizes.rank1, 1000);
        assert_eq!(config.prizes.rank2, 50_000_000);
        assert_eq!(config.selector.display_width, 800.0);
    }

    #[test]
    fn test_malformed_file_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let config = AppConfig::read_file(file.path());
        assert_eq!(config.api.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_base_url_override_trims_slash() {
        let mut config = AppConfig::default();
        config.apply_base_url_override("https://lotto.example.com/ ");
        assert_eq!(config.api.base_url, "https://lotto.example.com");

        config.apply_base_url_override("   ");
        assert_eq!(config.api.base_url, "https://lotto.example.com");
    }

    #[test]
    fn test_prize_table_amounts() {
        let prizes = PrizeTable::default();
        assert_eq!(prizes.amount(PrizeRank::First), 2_000_000_000);
        assert_eq!(prizes.amount(PrizeRank::Third), 1_500_000);
        assert_eq!(prizes.amount(PrizeRank::Fifth), 5_000);
    }
}
