//! Configuration for the ZLog dashboard.
//!
//! Defaults, then `config.toml` in the platform config dir, then `ZLOG_*`
//! environment variables. The result is translated into
//! `zlog_core::DashboardConfig`; CLI flags are applied by the binary on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use zlog_core::DashboardConfig;
use zlog_core::config::{
    DEFAULT_BACKEND_URL, DEFAULT_DEBOUNCE, DEFAULT_LOG_LIMIT, DEFAULT_POLL_INTERVAL,
    DEFAULT_TIMEOUT,
};

/// Environment prefix: `ZLOG_BASE_URL`, `ZLOG_POLL_INTERVAL_MS`, ...
pub const ENV_PREFIX: &str = "ZLOG_";

const MIN_POLL_INTERVAL_MS: u64 = 500;
const MAX_LOG_LIMIT: u32 = 1000;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// On-disk configuration. Every key is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Backend root URL.
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub debounce_ms: u64,
    /// Rows requested per log poll.
    pub log_limit: u32,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.into(),
            poll_interval_ms: duration_millis(DEFAULT_POLL_INTERVAL),
            debounce_ms: duration_millis(DEFAULT_DEBOUNCE),
            log_limit: DEFAULT_LOG_LIMIT,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

fn duration_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

impl Config {
    /// Validate and translate into the engine's config.
    pub fn to_dashboard_config(&self) -> Result<DashboardConfig, ConfigError> {
        let base_url: Url = self
            .base_url
            .parse()
            .map_err(|e| invalid("base_url", format!("{e}: {}", self.base_url)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(invalid(
                "base_url",
                format!("expected http or https, got '{}'", base_url.scheme()),
            ));
        }
        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            return Err(invalid(
                "poll_interval_ms",
                format!("must be at least {MIN_POLL_INTERVAL_MS}"),
            ));
        }
        if self.log_limit == 0 || self.log_limit > MAX_LOG_LIMIT {
            return Err(invalid(
                "log_limit",
                format!("must be between 1 and {MAX_LOG_LIMIT}"),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(invalid("timeout_secs", "must be positive"));
        }

        Ok(DashboardConfig {
            base_url,
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            debounce: Duration::from_millis(self.debounce_ms),
            log_limit: self.log_limit,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "zlog", "zlog").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("zlog");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// The layered figment for a given config file. A missing file is skipped.
pub fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX))
}

/// Load the config from `path` + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    Ok(figment_for(path).extract()?)
}

/// Load the config from the platform path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_without_file_or_env() {
        Jail::expect_with(|_jail| {
            let cfg: Config = figment_for(Path::new("missing.toml")).extract()?;
            assert_eq!(cfg, Config::default());

            let dash = cfg.to_dashboard_config().map_err(|e| e.to_string())?;
            assert_eq!(dash, DashboardConfig::default());
            Ok(())
        });
    }

    #[test]
    fn file_then_env_override() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                    base_url = "http://logs.internal:9000"
                    poll_interval_ms = 2000
                    log_limit = 50
                "#,
            )?;
            jail.set_env("ZLOG_POLL_INTERVAL_MS", "1000");

            let cfg: Config = figment_for(Path::new("config.toml")).extract()?;
            assert_eq!(cfg.base_url, "http://logs.internal:9000");
            assert_eq!(cfg.poll_interval_ms, 1000);
            assert_eq!(cfg.log_limit, 50);
            assert_eq!(cfg.debounce_ms, 400);

            let dash = cfg.to_dashboard_config().map_err(|e| e.to_string())?;
            assert_eq!(dash.poll_interval, Duration::from_secs(1));
            assert_eq!(dash.base_url.as_str(), "http://logs.internal:9000/");
            Ok(())
        });
    }

    #[test]
    fn rejects_bad_values() {
        let cfg = Config {
            base_url: "ftp://example.com".into(),
            ..Config::default()
        };
        assert!(matches!(
            cfg.to_dashboard_config(),
            Err(ConfigError::Validation { ref field, .. }) if field == "base_url"
        ));

        let cfg = Config {
            poll_interval_ms: 10,
            ..Config::default()
        };
        assert!(cfg.to_dashboard_config().is_err());

        let cfg = Config {
            log_limit: 0,
            ..Config::default()
        };
        assert!(cfg.to_dashboard_config().is_err());
    }

    #[test]
    fn malformed_file_is_a_figment_error() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "poll_interval_ms = \"soon\"")?;
            let result = load_config_from(Path::new("config.toml"));
            assert!(matches!(result, Err(ConfigError::Figment(_))));
            Ok(())
        });
    }
}
