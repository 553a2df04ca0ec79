//! Shared configuration for BreweryCo front-ends.
//!
//! Layered loading (built-in defaults, then the TOML file, then
//! `BREWERYCO_*` environment variables) and translation to
//! `breweryco_core::BreweryConfig`. Front-ends apply their own flag
//! overrides on the loaded [`Config`] before translating it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use breweryco_core::{BreweryConfig, MAX_PAGE_SIZE, PagingConfig, ProbeConfig};

/// Environment prefix; nested keys are separated by `__`
/// (`BREWERYCO_PAGING__PAGE_SIZE=50`).
pub const ENV_PREFIX: &str = "BREWERYCO_";

/// Upper bound on placeholder rows shown during the first load.
const MAX_PLACEHOLDER_ROWS: usize = 200;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiSection,

    #[serde(default)]
    pub paging: PagingSection,

    #[serde(default)]
    pub connectivity: ConnectivitySection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds. Unset means no timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PagingSection {
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_placeholder_rows")]
    pub placeholder_rows: usize,
}

impl Default for PagingSection {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            placeholder_rows: default_placeholder_rows(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConnectivitySection {
    #[serde(default = "default_true")]
    pub probe_enabled: bool,

    #[serde(default = "default_probe_host")]
    pub probe_host: String,

    #[serde(default = "default_probe_port")]
    pub probe_port: u16,

    #[serde(default = "default_probe_interval")]
    pub probe_interval_secs: u64,

    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,
}

impl Default for ConnectivitySection {
    fn default() -> Self {
        Self {
            probe_enabled: true,
            probe_host: default_probe_host(),
            probe_port: default_probe_port(),
            probe_interval_secs: default_probe_interval(),
            probe_timeout_secs: default_probe_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openbrewerydb.org".into()
}
fn default_page_size() -> u32 {
    PagingConfig::default().page_size
}
fn default_placeholder_rows() -> usize {
    PagingConfig::default().placeholder_rows
}
fn default_true() -> bool {
    true
}
fn default_probe_host() -> String {
    ProbeConfig::default().host
}
fn default_probe_port() -> u16 {
    ProbeConfig::default().port
}
fn default_probe_interval() -> u64 {
    ProbeConfig::default().interval.as_secs()
}
fn default_probe_timeout() -> u64 {
    ProbeConfig::default().timeout.as_secs()
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    /// Validate and convert into the core runtime configuration.
    pub fn to_brewery_config(&self) -> Result<BreweryConfig, ConfigError> {
        let base_url: url::Url = self
            .api
            .base_url
            .parse()
            .map_err(|_| {
                ConfigError::invalid("api.base_url", format!("invalid URL: {}", self.api.base_url))
            })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::invalid(
                "api.base_url",
                format!("expected an http(s) URL, got '{}'", base_url.scheme()),
            ));
        }

        let timeout = match self.api.timeout_secs {
            Some(0) => {
                return Err(ConfigError::invalid("api.timeout_secs", "must be at least 1"));
            }
            other => other.map(Duration::from_secs),
        };

        let page_size = self.paging.page_size;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::invalid(
                "paging.page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"),
            ));
        }
        if self.paging.placeholder_rows > MAX_PLACEHOLDER_ROWS {
            return Err(ConfigError::invalid(
                "paging.placeholder_rows",
                format!("must be at most {MAX_PLACEHOLDER_ROWS}"),
            ));
        }

        Ok(BreweryConfig {
            base_url,
            timeout,
            paging: PagingConfig {
                page_size,
                placeholder_rows: self.paging.placeholder_rows,
            },
            probe: self.connectivity.to_probe_config()?,
        })
    }
}

impl ConnectivitySection {
    fn to_probe_config(&self) -> Result<Option<ProbeConfig>, ConfigError> {
        if !self.probe_enabled {
            return Ok(None);
        }
        if self.probe_host.trim().is_empty() {
            return Err(ConfigError::invalid("connectivity.probe_host", "must not be empty"));
        }
        if self.probe_interval_secs == 0 {
            return Err(ConfigError::invalid(
                "connectivity.probe_interval_secs",
                "must be at least 1",
            ));
        }
        if self.probe_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "connectivity.probe_timeout_secs",
                "must be at least 1",
            ));
        }

        Ok(Some(ProbeConfig {
            host: self.probe_host.trim().to_owned(),
            port: self.probe_port,
            interval: Duration::from_secs(self.probe_interval_secs),
            timeout: Duration::from_secs(self.probe_timeout_secs),
        }))
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "breweryco", "breweryco").map_or_else(
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
    p.push("breweryco");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// The full provider stack for a config file at `path`.
pub fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Extract a `Config` from any provider stack.
pub fn load_from(figment: &Figment) -> Result<Config, ConfigError> {
    Ok(figment.extract()?)
}

/// Load config from an explicit file path + environment.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    load_from(&figment_for(path))
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
