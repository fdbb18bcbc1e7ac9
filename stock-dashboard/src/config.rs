//! Dashboard configuration
//!
//! Built either programmatically with the `with_*` builders or from the
//! environment (a `.env` file is honoured).

use std::{path::PathBuf, time::Duration};

use crate::error::DashboardError;

/// Dashboard configuration
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Origin of the recommendation service
    pub base_url: String,
    /// Period of the bulk refresh
    pub refresh_interval: Duration,
    /// Period of the countdown redraw
    pub countdown_interval: Duration,
    /// Timeout applied to every request
    pub request_timeout: Duration,
    /// Whether the status bar carries the countdown display
    pub show_countdown: bool,
    /// Directory for the log file
    pub log_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            refresh_interval: Duration::from_secs(5 * 60),
            countdown_interval: Duration::from_secs(1),
            request_timeout: Duration::from_secs(10),
            show_countdown: true,
            log_dir: PathBuf::from("logs"),
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration with custom base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Load configuration from environment variables
    ///
    /// `API_BASE_URL`, `REFRESH_INTERVAL_SECS`, `REQUEST_TIMEOUT_SECS`,
    /// `SHOW_COUNTDOWN` and `LOG_DIR`. Unset variables keep their default.
    pub fn from_env() -> Result<Self, DashboardError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DashboardError> {
        let mut config = Self::default();

        if let Some(url) = lookup("API_BASE_URL") {
            config.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(secs) = lookup("REFRESH_INTERVAL_SECS") {
            config.refresh_interval = parse_secs("REFRESH_INTERVAL_SECS", &secs)?;
        }
        if let Some(secs) = lookup("REQUEST_TIMEOUT_SECS") {
            config.request_timeout = parse_secs("REQUEST_TIMEOUT_SECS", &secs)?;
        }
        if let Some(flag) = lookup("SHOW_COUNTDOWN") {
            config.show_countdown = match flag.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(DashboardError::Config(format!(
                        "SHOW_COUNTDOWN must be a boolean, got '{other}'"
                    )));
                }
            };
        }
        if let Some(dir) = lookup("LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }

        Ok(config)
    }

    /// Set bulk refresh interval
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Set countdown redraw interval
    pub fn with_countdown_interval(mut self, interval: Duration) -> Self {
        self.countdown_interval = interval;
        self
    }

    /// Set per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Enable or disable the countdown display
    pub fn with_countdown(mut self, show: bool) -> Self {
        self.show_countdown = show;
        self
    }
}

fn parse_secs(key: &str, value: &str) -> Result<Duration, DashboardError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(DashboardError::Config(format!("{key} must be greater than zero"))),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(_) => Err(DashboardError::Config(format!(
            "{key} must be a number of seconds, got '{value}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_builder() {
        let config = DashboardConfig::new("http://localhost:8080")
            .with_refresh_interval(Duration::from_secs(60))
            .with_countdown_interval(Duration::from_millis(500))
            .with_request_timeout(Duration::from_secs(3))
            .with_countdown(false);

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.refresh_interval, Duration::from_secs(60));
        assert_eq!(config.countdown_interval, Duration::from_millis(500));
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert!(!config.show_countdown);
    }

    #[test]
    fn test_default_config() {
        let config = DashboardConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.refresh_interval, Duration::from_secs(300));
        assert_eq!(config.countdown_interval, Duration::from_secs(1));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.show_countdown);
    }

    #[test]
    fn test_config_from_lookup() {
        let config = DashboardConfig::from_lookup(lookup_from(&[
            ("API_BASE_URL", "http://dashboard.local:5000/"),
            ("REFRESH_INTERVAL_SECS", "120"),
            ("SHOW_COUNTDOWN", "off"),
            ("LOG_DIR", "/tmp/dashboard"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://dashboard.local:5000");
        assert_eq!(config.refresh_interval, Duration::from_secs(120));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(!config.show_countdown);
        assert_eq!(config.log_dir, PathBuf::from("/tmp/dashboard"));
    }

    #[test]
    fn test_config_rejects_bad_values() {
        for pairs in [
            [("REFRESH_INTERVAL_SECS", "five")],
            [("REFRESH_INTERVAL_SECS", "0")],
            [("REQUEST_TIMEOUT_SECS", "-1")],
            [("SHOW_COUNTDOWN", "maybe")],
        ] {
            let result = DashboardConfig::from_lookup(lookup_from(&pairs));
            assert!(
                matches!(result, Err(DashboardError::Config(_))),
                "{pairs:?} should be rejected"
            );
        }
    }
}
