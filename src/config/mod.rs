use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

pub use crate::proximity::ThresholdConfig;


/// Complete Skyfuse configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkyfuseConfig {
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub aircraft: AircraftSourceConfig,
    #[serde(default)]
    pub satellites: SatelliteSourceConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

/// Refresh cycle timing
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    /// Upper bound on a single source fetch
    #[serde(default = "default_source_timeout_seconds")]
    pub source_timeout_seconds: u64,
    /// Reuse a failed source's last good records instead of dropping them
    #[serde(default)]
    pub carry_forward_on_failure: bool,
}

fn default_interval_seconds() -> u64 {
    30
}

fn default_source_timeout_seconds() -> u64 {
    10
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            source_timeout_seconds: default_source_timeout_seconds(),
            carry_forward_on_failure: false,
        }
    }
}

/// Geographic area of interest for aircraft, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BoundingBox {
    #[serde(default = "default_min_lat")]
    pub min_lat: f64,
    #[serde(default = "default_min_lon")]
    pub min_lon: f64,
    #[serde(default = "default_max_lat")]
    pub max_lat: f64,
    #[serde(default = "default_max_lon")]
    pub max_lon: f64,
}

fn default_min_lat() -> f64 {
    27.0
}

fn default_min_lon() -> f64 {
    76.0
}

fn default_max_lat() -> f64 {
    29.0
}

fn default_max_lon() -> f64 {
    78.0
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self {
            min_lat: default_min_lat(),
            min_lon: default_min_lon(),
            max_lat: default_max_lat(),
            max_lon: default_max_lon(),
        }
    }
}

impl BoundingBox {
    /// Inclusive on every edge
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        latitude >= self.min_lat
            && latitude <= self.max_lat
            && longitude >= self.min_lon
            && longitude <= self.max_lon
    }

    fn validate(&self) -> Result<()> {
        let lat_ok = |v: f64| (-90.0..=90.0).contains(&v);
        let lon_ok = |v: f64| (-180.0..=180.0).contains(&v);
        if !(lat_ok(self.min_lat) && lat_ok(self.max_lat)) {
            bail!("bounding_box latitudes must lie in [-90, 90]");
        }
        if !(lon_ok(self.min_lon) && lon_ok(self.max_lon)) {
            bail!("bounding_box longitudes must lie in [-180, 180]");
        }
        if self.min_lat >= self.max_lat || self.min_lon >= self.max_lon {
            bail!(
                "bounding_box is inverted or empty: ({}, {}) to ({}, {})",
                self.min_lat,
                self.min_lon,
                self.max_lat,
                self.max_lon
            );
        }
        Ok(())
    }
}

/// OpenSky aircraft source
#[derive(Debug, Clone, Deserialize)]
pub struct AircraftSourceConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_opensky_url")]
    pub base_url: String,
    /// 0 polls on every refresh cycle
    #[serde(default)]
    pub poll_interval_seconds: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_opensky_url() -> String {
    "https://opensky-network.org/api".to_string()
}

impl Default for AircraftSourceConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: default_opensky_url(),
            poll_interval_seconds: 0,
        }
    }
}

/// CelesTrak orbital element source
#[derive(Debug, Clone, Deserialize)]
pub struct SatelliteSourceConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_celestrak_url")]
    pub base_url: String,
    /// NORAD catalog numbers fetched one request each
    #[serde(default = "default_catalog_numbers")]
    pub catalog_numbers: Vec<u64>,
    /// CelesTrak group names (e.g. "stations")
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default = "default_element_poll_interval")]
    pub poll_interval_seconds: u64,
}

fn default_celestrak_url() -> String {
    "https://celestrak.org/NORAD/elements/gp.php".to_string()
}

fn default_catalog_numbers() -> Vec<u64> {
    vec![25544, 48274] // ISS, Tiangong
}

fn default_element_poll_interval() -> u64 {
    6 * 60 * 60
}

impl Default for SatelliteSourceConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            base_url: default_celestrak_url(),
            catalog_numbers: default_catalog_numbers(),
            groups: Vec::new(),
            poll_interval_seconds: default_element_poll_interval(),
        }
    }
}

/// Dashboard API
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

fn default_bind_address() -> String {
    "0.0.0.0:5000".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
        }
    }
}

impl SkyfuseConfig {
    /// Reject settings the scheduler and detector cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.refresh.interval_seconds == 0 {
            bail!("refresh.interval_seconds must be greater than zero");
        }
        if self.refresh.source_timeout_seconds == 0 {
            bail!("refresh.source_timeout_seconds must be greater than zero");
        }
        self.bounding_box.validate()?;
        self.thresholds
            .validate()
            .map_err(anyhow::Error::msg)?;
        Ok(())
    }

    /// Override file values from environment variables.
    ///
    /// Unparsable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(n) = lookup("SKYFUSE_REFRESH_INTERVAL_SECONDS").and_then(|v| v.parse().ok()) {
            self.refresh.interval_seconds = n;
        }
        if let Some(n) = lookup("SKYFUSE_SOURCE_TIMEOUT_SECONDS").and_then(|v| v.parse().ok()) {
            self.refresh.source_timeout_seconds = n;
        }
        if let Some(v) = lookup("SKYFUSE_API_BIND") {
            self.api.bind_address = v;
        }
        if let Some(v) = lookup("SKYFUSE_OPENSKY_URL") {
            self.aircraft.base_url = v;
        }
        if let Some(v) = lookup("SKYFUSE_CELESTRAK_URL") {
            self.satellites.base_url = v;
        }
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<SkyfuseConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: SkyfuseConfig = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}

/// Load the file if it exists, else start from defaults; then apply
/// environment overrides and validate.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<SkyfuseConfig> {
    let path = path.as_ref();
    let mut config = if path.exists() {
        info!(path = %path.display(), "Loading configuration");
        load_config(path)?
    } else {
        info!(path = %path.display(), "No config file, using defaults");
        SkyfuseConfig::default()
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}
