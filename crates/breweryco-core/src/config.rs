// ── Runtime configuration ──
//
// These types describe how to reach the brewery API and how the screens
// page through it. The config crate builds a `BreweryConfig` from files
// and env; core never reads config files.

use std::time::Duration;

use url::Url;

/// Largest page the API accepts.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Reachability probe settings for the connectivity monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Host to open a TCP connection to.
    pub host: String,
    pub port: u16,
    /// Time between probes.
    pub interval: Duration,
    /// Per-probe connect timeout.
    pub timeout: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            host: "api.openbrewerydb.org".into(),
            port: 443,
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(3),
        }
    }
}

/// Paging behaviour of the breweries screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    /// Rows requested per page.
    pub page_size: u32,
    /// Placeholder rows shown while the first page loads.
    pub placeholder_rows: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            page_size: 100,
            placeholder_rows: 20,
        }
    }
}

/// Everything the service container needs.
#[derive(Debug, Clone)]
pub struct BreweryConfig {
    /// API root, e.g. `https://api.openbrewerydb.org`.
    pub base_url: Url,
    /// Per-request timeout. `None` = unbounded.
    pub timeout: Option<Duration>,
    pub paging: PagingConfig,
    /// `None` disables the background probe; connectivity then stays at
    /// whatever was last set.
    pub probe: Option<ProbeConfig>,
}

impl Default for BreweryConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("https://api.openbrewerydb.org").expect("static URL is valid"),
            timeout: None,
            paging: PagingConfig::default(),
            probe: Some(ProbeConfig::default()),
        }
    }
}
