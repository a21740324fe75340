use std::{path::PathBuf, time::Duration};

use log::LevelFilter;

/// Delays and retry budgets used by the page notifier and the coordinator.
#[derive(Debug, Clone)]
pub struct Timings {
    /// Fallback rescan period for state changes the event listeners miss.
    pub rescan_interval: Duration,

    /// Coalescing window for DOM-mutation-triggered rescans.
    pub mutation_debounce: Duration,

    /// Delay after page readiness before the first scan (autoplay capture).
    pub initial_check_delay: Duration,

    /// Wait for a page to finish rendering before a log check.
    pub settle_delay: Duration,

    /// Grace period between a video ending and switching tabs.
    pub advance_delay: Duration,

    pub probe_attempts: u32,
    pub probe_backoff_after_response: Duration,
    pub probe_backoff_after_error: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            rescan_interval: Duration::from_secs(3),
            mutation_debounce: Duration::from_millis(500),
            initial_check_delay: Duration::from_millis(1500),
            settle_delay: Duration::from_secs(2),
            advance_delay: Duration::from_secs(1),
            probe_attempts: 3,
            probe_backoff_after_response: Duration::from_millis(800),
            probe_backoff_after_error: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UrlLogConfig {
    /// Directory holding the settings/log database.
    pub data_dir: PathBuf,

    /// Directory receiving `urls-<date>.txt` exports.
    pub export_dir: PathBuf,

    /// URL prefixes of internal browser pages, never logged.
    pub privileged_schemes: Vec<String>,

    pub log_level: LevelFilter,
    pub timings: Timings,
}

impl Default for UrlLogConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("urllog-data"),
            export_dir: PathBuf::from("."),
            privileged_schemes: vec!["chrome://".into(), "chrome-extension://".into()],
            log_level: LevelFilter::Info,
            timings: Timings::default(),
        }
    }
}

impl UrlLogConfig {
    /// Defaults overridden by `URLLOG_DATA_DIR`, `URLLOG_EXPORT_DIR` and
    /// `URLLOG_DEBUG`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("URLLOG_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = std::env::var("URLLOG_EXPORT_DIR") {
            config.export_dir = PathBuf::from(dir);
        }

        let debug_mode = std::env::var("URLLOG_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if debug_mode {
            config.log_level = LevelFilter::Debug;
        }

        config
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("urllog.sqlite3")
    }

    pub fn is_privileged_url(&self, url: &str) -> bool {
        self.privileged_schemes
            .iter()
            .any(|scheme| url.starts_with(scheme.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_pages_are_privileged() {
        let config = UrlLogConfig::default();
        assert!(config.is_privileged_url("chrome://settings/"));
        assert!(config.is_privileged_url("chrome-extension://abcdef/popup.html"));
        assert!(!config.is_privileged_url("https://www.youtube.com/watch?v=1"));
    }
}
