//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::{FixedOffset, Offset, Utc};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use lanes_core::FieldConfig;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Attribute names used to read snapshot records.
    #[serde(flatten)]
    pub fields: FieldConfig,

    /// Zone whose calendar days are laid out: `local`, `UTC`, or an offset
    /// such as `+02:00`.
    pub timezone: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("fields", &self.fields)
            .field("timezone", &self.timezone)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fields: FieldConfig::default(),
            timezone: "local".to_string(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (LANES_*)
        figment = figment.merge(Env::prefixed("LANES_"));

        figment.extract()
    }

    /// Parses the configured time zone.
    pub fn zone(&self) -> Result<Zone> {
        self.timezone.parse()
    }
}

/// The time zone day keys are computed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// The machine's local zone, daylight saving included.
    Local,
    Fixed(FixedOffset),
}

impl Zone {
    /// Display name: the IANA name for the local zone, `UTC`, or the offset.
    pub fn name(&self) -> String {
        match self {
            Self::Local => iana_time_zone::get_timezone().unwrap_or_else(|_| "local".to_string()),
            Self::Fixed(offset) if offset.local_minus_utc() == 0 => "UTC".to_string(),
            Self::Fixed(offset) => offset.to_string(),
        }
    }
}

impl std::str::FromStr for Zone {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }
        if s.eq_ignore_ascii_case("utc") || s == "Z" {
            return Ok(Self::Fixed(Utc.fix()));
        }
        match s.parse::<FixedOffset>() {
            Ok(offset) => Ok(Self::Fixed(offset)),
            Err(_) => bail!("invalid timezone {s:?}: use \"local\", \"UTC\" or an offset like +02:00"),
        }
    }
}

/// Returns the platform-specific config directory for lanes.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lanes"))
}
