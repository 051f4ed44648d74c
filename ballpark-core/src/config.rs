use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    location::{LocationSourceId, ipapi::DEFAULT_IPAPI_URL},
    presenter::{DEFAULT_DATE_CAP, RiskThresholds},
    stadium::{DEFAULT_STADIUM, Stadium},
};

/// API origin used when running against a local backend.
pub const LOCAL_API_BASE: &str = "http://localhost:8080";

/// Origin baked in at build time (`BALLPARK_API_BASE=... cargo build`).
pub const BUILD_API_BASE: Option<&str> = option_env!("BALLPARK_API_BASE");

/// How the user's position is obtained.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// "ipapi" or "disabled".
    pub source: String,
    pub url: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            source: LocationSourceId::IpApi.as_str().to_string(),
            url: DEFAULT_IPAPI_URL.to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_base = "https://ballpark.example.com"
/// default_stadium = "잠실"
/// date_cap = 5
/// rain_affected_mm = 2.0
///
/// [location]
/// source = "ipapi"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base: Option<String>,
    pub default_stadium: String,
    /// How many upcoming dates are offered.
    pub date_cap: usize,
    pub rain_affected_mm: f64,
    pub location: LocationConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: None,
            default_stadium: DEFAULT_STADIUM.to_string(),
            date_cap: DEFAULT_DATE_CAP,
            rain_affected_mm: RiskThresholds::default().rain_affected_mm,
            location: LocationConfig::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "ballpark-weather", "ballpark-weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// The configured default stadium, validated against the table.
    pub fn default_stadium(&self) -> Result<&'static Stadium> {
        Stadium::find(&self.default_stadium).map_err(|err| {
            anyhow!(
                "Invalid default_stadium in config: {err}\n\
                 Hint: run `ballpark configure` to pick a stadium."
            )
        })
    }

    pub fn location_source_id(&self) -> Result<LocationSourceId> {
        LocationSourceId::try_from(self.location.source.as_str())
    }

    pub fn thresholds(&self) -> RiskThresholds {
        RiskThresholds { rain_affected_mm: self.rain_affected_mm, ..RiskThresholds::default() }
    }

    /// API origin for this run. `explicit` is a command-line or environment override.
    pub fn api_base(&self, local: bool, explicit: Option<&str>) -> String {
        let explicit = non_blank(explicit).or_else(|| non_blank(self.api_base.as_deref()));
        resolve_api_base(local, explicit, BUILD_API_BASE)
    }
}

/// Local runs always talk to [`LOCAL_API_BASE`]; otherwise the first
/// non-blank of `explicit` and `build_origin`, falling back to local.
pub fn resolve_api_base(local: bool, explicit: Option<&str>, build_origin: Option<&str>) -> String {
    if local {
        return LOCAL_API_BASE.to_string();
    }

    non_blank(explicit)
        .or_else(|| non_blank(build_origin))
        .unwrap_or(LOCAL_API_BASE)
        .trim_end_matches('/')
        .to_string()
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
