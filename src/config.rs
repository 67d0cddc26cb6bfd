//! Application configuration
//!
//! Endpoints for the remote services plus tracking parameters. Every value
//! has a default except the Supabase project, which is only needed for
//! authentication and the location log.

use app_core::tracker::{Accuracy, TrackerConfig};
use nav_client::geocode::DEFAULT_NOMINATIM_URL;
use nav_client::http::ClientConfig;
use nav_client::routing::DEFAULT_OSRM_URL;
use std::time::Duration;
use thiserror::Error;

/// Prefix of all environment variables read by [`AppConfig::from_env`]
pub const ENV_PREFIX: &str = "DRIVE_OS_";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A variable held a value that could not be parsed
    #[error("Invalid value for {key}: {value}")]
    Invalid {
        /// Variable name
        key: String,
        /// Offending value
        value: String,
    },

    /// A required setting is missing
    #[error("Missing setting: {0}")]
    Missing(String),
}

/// Result type for configuration
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Supabase project credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    /// Project URL
    pub url: String,
    /// Public anon key
    pub anon_key: String,
}

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Place lookup service
    pub nominatim_url: String,
    /// Routing service
    pub osrm_url: String,
    /// Auth and location log backend
    pub supabase: Option<SupabaseConfig>,
    /// User agent sent to every service
    pub user_agent: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Location tracking parameters
    pub tracker: TrackerConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            osrm_url: DEFAULT_OSRM_URL.to_string(),
            supabase: None,
            user_agent: None,
            timeout: Duration::from_secs(30),
            tracker: TrackerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read configuration from `DRIVE_OS_*` environment variables
    ///
    /// Recognized keys: `NOMINATIM_URL`, `OSRM_URL`, `SUPABASE_URL`,
    /// `SUPABASE_ANON_KEY`, `USER_AGENT`, `TIMEOUT_SECS`,
    /// `TRACKER_ACCURACY`, `TRACKER_MIN_DISTANCE_M`, `TRACKER_INTERVAL_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(url) = lookup("NOMINATIM_URL") {
            config.nominatim_url = url;
        }
        if let Some(url) = lookup("OSRM_URL") {
            config.osrm_url = url;
        }

        config.supabase = match (lookup("SUPABASE_URL"), lookup("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(SupabaseConfig { url, anon_key }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("SUPABASE_ANON_KEY".to_string())),
            (None, Some(_)) => return Err(ConfigError::Missing("SUPABASE_URL".to_string())),
        };

        config.user_agent = lookup("USER_AGENT");

        if let Some(secs) = parse::<u64>(&lookup, "TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(accuracy) = parse::<Accuracy>(&lookup, "TRACKER_ACCURACY")? {
            config.tracker = config.tracker.with_accuracy(accuracy);
        }
        if let Some(meters) = parse::<f64>(&lookup, "TRACKER_MIN_DISTANCE_M")? {
            config.tracker = config.tracker.with_min_distance(meters);
        }
        if let Some(secs) = parse::<u64>(&lookup, "TRACKER_INTERVAL_SECS")? {
            let fastest = config.tracker.fastest_interval.min(Duration::from_secs(secs));
            config.tracker = config
                .tracker
                .with_intervals(Duration::from_secs(secs), fastest);
        }

        Ok(config)
    }

    /// Supabase credentials, failing when they are not configured
    pub fn require_supabase(&self) -> Result<&SupabaseConfig> {
        self.supabase
            .as_ref()
            .ok_or_else(|| ConfigError::Missing("SUPABASE_URL".to_string()))
    }

    /// Client configuration for a service at `base_url`
    pub fn client(&self, base_url: &str) -> ClientConfig {
        let config = ClientConfig::new(base_url).with_timeout(self.timeout);
        match &self.user_agent {
            Some(user_agent) => config.with_user_agent(user_agent.clone()),
            None => config,
        }
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                key: format!("{ENV_PREFIX}{key}"),
                value,
            }),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.nominatim_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.osrm_url, "http://router.project-osrm.org");
        assert!(config.require_supabase().is_err());
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("OSRM_URL", "http://localhost:5000"),
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("TIMEOUT_SECS", "5"),
            ("TRACKER_MIN_DISTANCE_M", "25"),
            ("TRACKER_ACCURACY", "balanced"),
        ]))
        .unwrap();

        assert_eq!(config.osrm_url, "http://localhost:5000");
        assert_eq!(config.require_supabase().unwrap().anon_key, "anon");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.tracker.min_distance_m, 25.0);
        assert_eq!(config.tracker.accuracy, Accuracy::Balanced);
        assert_eq!(config.client("http://x").timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_number() {
        let err = AppConfig::from_lookup(lookup(&[("TIMEOUT_SECS", "soon")])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for DRIVE_OS_TIMEOUT_SECS: soon");
    }

    #[test]
    fn test_invalid_accuracy() {
        let err = AppConfig::from_lookup(lookup(&[("TRACKER_ACCURACY", "best")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key, .. } if key == "DRIVE_OS_TRACKER_ACCURACY"));
    }

    #[test]
    fn test_half_configured_supabase() {
        let err = AppConfig::from_lookup(lookup(&[("SUPABASE_URL", "https://p.supabase.co")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Missing(key) if key == "SUPABASE_ANON_KEY"));
    }

    #[test]
    fn test_interval_keeps_fastest_below_interval() {
        let config = AppConfig::from_lookup(lookup(&[("TRACKER_INTERVAL_SECS", "3")])).unwrap();
        assert_eq!(config.tracker.interval, Duration::from_secs(3));
        assert_eq!(config.tracker.fastest_interval, Duration::from_secs(3));
    }
}
