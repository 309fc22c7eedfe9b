//! Layered application settings.
//!
//! Sources, lowest priority first:
//!
//! 1. built-in defaults
//! 2. an optional settings file (`--config`, format by extension)
//! 3. `DBWATCH_*` environment variables
//! 4. command-line overrides
//!
//! ```toml
//! api_base_url = "http://monitoring.internal:8085"
//! dashboard_interval_ms = 5000
//! log_level = "debug"
//! log_file = "/tmp/dbwatch.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use dbwatch_client::{ApiClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "DBWATCH";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_ms: u64,
    /// Polling cadence of the dashboard.
    pub dashboard_interval_ms: u64,
    /// Polling cadence while an instance detail view is open.
    pub detail_interval_ms: u64,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
    /// Where `config pull/push/validate/init` read and write YAML files.
    pub config_dir: PathBuf,
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Load settings from `file`, the process environment and `overrides`.
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        Self::load_from(file, None, overrides)
    }

    /// Like [`Settings::load`], reading environment variables from `env`
    /// instead of the process when given.
    pub fn load_from(
        file: Option<&Path>,
        env: Option<config::Map<String, String>>,
        overrides: &Overrides,
    ) -> Result<Self> {
        let mut builder = Config::builder()
            .set_default("api_base_url", DEFAULT_BASE_URL)?
            .set_default("request_timeout_ms", DEFAULT_TIMEOUT.as_millis() as u64)?
            .set_default("dashboard_interval_ms", 3000u64)?
            .set_default("detail_interval_ms", 1500u64)?
            .set_default("log_level", "info")?
            .set_default("config_dir", "config")?;

        if let Some(path) = file {
            if !path.exists() {
                bail!("settings file not found: {}", path.display());
            }
            builder = builder.add_source(File::from(path));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .set_override_option("api_base_url", overrides.base_url.clone())?
            .set_override_option(
                "log_file",
                overrides
                    .log_file
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?
            .build()
            .context("failed to read settings")?
            .try_deserialize()
            .context("invalid settings")?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            bail!("api_base_url must not be empty");
        }
        for (key, value) in [
            ("request_timeout_ms", self.request_timeout_ms),
            ("dashboard_interval_ms", self.dashboard_interval_ms),
            ("detail_interval_ms", self.detail_interval_ms),
        ] {
            if value == 0 {
                bail!("{key} must be greater than zero");
            }
        }
        Ok(())
    }

    pub fn dashboard_interval(&self) -> Duration {
        Duration::from_millis(self.dashboard_interval_ms)
    }

    pub fn detail_interval(&self) -> Duration {
        Duration::from_millis(self.detail_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Build the HTTP client these settings describe.
    pub fn api_client(&self) -> Result<ApiClient> {
        ApiClient::builder()
            .base_url(&self.api_base_url)
            .timeout(self.request_timeout())
            .build()
            .context("failed to build HTTP client")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> Option<config::Map<String, String>> {
        Some(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load_from(None, env(&[]), &Overrides::default()).unwrap();
        assert_eq!(settings.api_base_url, "http://localhost:8085");
        assert_eq!(settings.dashboard_interval(), Duration::from_millis(3000));
        assert_eq!(settings.detail_interval(), Duration::from_millis(1500));
        assert_eq!(settings.request_timeout(), Duration::from_secs(10));
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.log_file, None);
        assert_eq!(settings.config_dir, PathBuf::from("config"));
    }

    #[test]
    fn test_file_then_env_then_overrides() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "api_base_url = \"http://from-file:1\"\ndashboard_interval_ms = 5000\nlog_level = \"debug\""
        )
        .unwrap();

        let settings = Settings::load_from(
            Some(file.path()),
            env(&[
                ("DBWATCH_DASHBOARD_INTERVAL_MS", "7000"),
                ("DBWATCH_API_BASE_URL", "http://from-env:2"),
            ]),
            &Overrides::default(),
        )
        .unwrap();
        assert_eq!(settings.api_base_url, "http://from-env:2");
        assert_eq!(settings.dashboard_interval_ms, 7000);
        assert_eq!(settings.log_level, "debug");

        let settings = Settings::load_from(
            Some(file.path()),
            env(&[("DBWATCH_API_BASE_URL", "http://from-env:2")]),
            &Overrides {
                base_url: Some("http://from-cli:3".to_string()),
                log_file: Some(PathBuf::from("/tmp/dbwatch.log")),
            },
        )
        .unwrap();
        assert_eq!(settings.api_base_url, "http://from-cli:3");
        assert_eq!(settings.log_file, Some(PathBuf::from("/tmp/dbwatch.log")));
        assert_eq!(settings.dashboard_interval_ms, 5000);
    }

    #[test]
    fn test_unrelated_env_is_ignored() {
        let settings = Settings::load_from(
            None,
            env(&[("OTHER_API_BASE_URL", "http://nope"), ("PATH", "/bin")]),
            &Overrides::default(),
        )
        .unwrap();
        assert_eq!(settings.api_base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = Settings::load_from(
            None,
            env(&[("DBWATCH_DETAIL_INTERVAL_MS", "0")]),
            &Overrides::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("detail_interval_ms"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        assert!(Settings::load_from(Some(&missing), env(&[]), &Overrides::default()).is_err());
    }

    #[test]
    fn test_api_client_uses_base_url() {
        let settings = Settings::load_from(
            None,
            env(&[("DBWATCH_API_BASE_URL", "http://db-monitor:9000/")]),
            &Overrides::default(),
        )
        .unwrap();
        let client = settings.api_client().unwrap();
        assert_eq!(client.base_url(), "http://db-monitor:9000");
    }
}
