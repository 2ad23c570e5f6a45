//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.
//!
//! Every section and every field is optional; anything left out falls back
//! to the defaults below.

use serde::de::Error;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use tracing::info;

use crate::control::channels::{ChannelRange, DEFAULT_RC_MAX, DEFAULT_RC_MIN};
use crate::crsf::protocol::CRSF_CHANNEL_VALUE_MAX;
use crate::error::{CrsfLinkError, Result};

/// Baud rates accepted for the serial link
pub const SUPPORTED_BAUD_RATES: &[u32] = &[
    115_200, 400_000, 416_666, 420_000, 921_600, 1_870_000, 3_750_000,
];

/// RC channel frame rates accepted for the outbound link
pub const SUPPORTED_PACKET_RATES_HZ: &[u32] = &[50, 150, 250, 500, 1000];

/// Main configuration structure
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub serial: SerialConfig,

    #[serde(default)]
    pub crsf: CrsfConfig,

    #[serde(default)]
    pub channels: ChannelConfig,
}

/// Serial port configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device path, empty to auto-detect
    #[serde(default = "default_serial_port")]
    pub port: String,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

/// CRSF link configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct CrsfConfig {
    /// How often RC channel frames are sent when no control line arrives
    #[serde(default = "default_packet_rate_hz")]
    pub packet_rate_hz: u32,
}

/// CRSF values the stick range is mapped onto
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    #[serde(default = "default_rc_min")]
    pub rc_min: u16,

    #[serde(default = "default_rc_max")]
    pub rc_max: u16,
}

// Default value functions
fn default_serial_port() -> String { "/dev/serial0".to_string() }
fn default_baud_rate() -> u32 { 420_000 }

fn default_packet_rate_hz() -> u32 { 250 }

fn default_rc_min() -> u16 { DEFAULT_RC_MIN }
fn default_rc_max() -> u16 { DEFAULT_RC_MAX }

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_serial_port(),
            baud_rate: default_baud_rate(),
        }
    }
}

impl Default for CrsfConfig {
    fn default() -> Self {
        Self {
            packet_rate_hz: default_packet_rate_hz(),
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            rc_min: default_rc_min(),
            rc_max: default_rc_max(),
        }
    }
}

impl CrsfConfig {
    /// Time between periodic RC channel frames
    ///
    /// Only meaningful after validation, which rules out a zero rate.
    pub fn packet_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.packet_rate_hz.max(1)))
    }
}

impl ChannelConfig {
    pub fn range(&self) -> ChannelRange {
        ChannelRange {
            min: self.rc_min,
            max: self.rc_max,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use crsf_link::config::Config;
    ///
    /// let config = Config::load("config/default.toml")?;
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Like [`load`](Self::load), but a missing file yields the defaults
    ///
    /// Any other read error, and any parse or validation error, is still
    /// returned.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No config at {}, using defaults", path.display());
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any configuration value is out of valid range
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_BAUD_RATES.contains(&self.serial.baud_rate) {
            return Err(invalid(format!(
                "baud_rate must be one of: {}",
                join(SUPPORTED_BAUD_RATES)
            )));
        }

        if !SUPPORTED_PACKET_RATES_HZ.contains(&self.crsf.packet_rate_hz) {
            return Err(invalid(format!(
                "packet_rate_hz must be one of: {}",
                join(SUPPORTED_PACKET_RATES_HZ)
            )));
        }

        if self.channels.rc_min >= self.channels.rc_max {
            return Err(invalid("rc_min must be less than rc_max"));
        }

        if self.channels.rc_max > CRSF_CHANNEL_VALUE_MAX {
            return Err(invalid(format!(
                "rc_max must not exceed {} (11-bit channel)",
                CRSF_CHANNEL_VALUE_MAX
            )));
        }

        Ok(())
    }
}

fn invalid(msg: impl std::fmt::Display) -> CrsfLinkError {
    CrsfLinkError::Config(toml::de::Error::custom(msg))
}

fn join(values: &[u32]) -> String {
    values
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
