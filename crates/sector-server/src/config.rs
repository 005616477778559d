//! Server configuration from environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use sector_core::{BandThresholds, ClassifierRules};

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub traffic_feed_url: String,
    pub sector_source: String,
    pub refresh_secs: u64,
    pub perimeter_sector: String,
    pub controller_prefix: String,
    pub groups_path: Option<PathBuf>,
    pub fetch_timeout_secs: u64,
    pub fetch_backoff_max_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: parsed("SECTOR_PORT").unwrap_or(3000),
            traffic_feed_url: env::var("TRAFFIC_FEED_URL")
                .unwrap_or_else(|_| "https://data.vatsim.net/v3/vatsim-data.json".to_string()),
            sector_source: env::var("SECTOR_SOURCE")
                .unwrap_or_else(|_| "sectors.geojson".to_string()),
            refresh_secs: parsed("REFRESH_SECS").filter(|s| *s > 0).unwrap_or(60),
            perimeter_sector: non_empty("PERIMETER_SECTOR").unwrap_or_else(|| "zhu".to_string()),
            controller_prefix: non_empty("CONTROLLER_PREFIX").unwrap_or_else(|| "HOU".to_string()),
            groups_path: non_empty("GROUPS_PATH").map(PathBuf::from),
            fetch_timeout_secs: parsed("FETCH_TIMEOUT_SECS").filter(|s| *s > 0).unwrap_or(10),
            fetch_backoff_max_secs: parsed("FETCH_BACKOFF_MAX_SECS").unwrap_or(300),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn classifier_rules(&self) -> ClassifierRules {
        ClassifierRules::default().with_perimeter(self.perimeter_sector.clone())
    }

    pub fn band_thresholds(&self) -> BandThresholds {
        BandThresholds::default()
    }
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
