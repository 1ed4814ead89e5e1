//! Configuration file for the panel link.
//!
//! # Example Configuration
//!
//! ```toml
//! [device]
//! name = "*"
//! wiring_mode = 2
//! attach_retry = "5s"
//! read_timeout = "100ms"
//!
//! [panel]
//! input_controls = "joy8way - 2P - 6Bt"
//! ```
//!
//! Every key is optional; unknown keys are rejected.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::discovery::ANY_DEVICE;
use crate::error::{Result, SmartAsdError};
use crate::leds::WiringMode;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmartAsdConfig {
    pub device: DeviceConfig,
    pub panel: PanelConfig,
}

/// Which board to use and how the panel is wired to it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceConfig {
    /// Device name to attach, `"*"` for the first one found
    pub name: String,

    /// 0 none, 1 hybrid, 2 dedicated, 3 dedicated with six buttons
    pub wiring_mode: WiringMode,

    /// Minimum time between two attach attempts
    #[serde(with = "humantime_serde")]
    pub attach_retry: Duration,

    /// How long a single input read may block
    #[serde(with = "humantime_serde")]
    pub read_timeout: Duration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: ANY_DEVICE.to_string(),
            wiring_mode: WiringMode::Dedicated,
            attach_retry: Duration::from_millis(5000),
            read_timeout: Duration::from_millis(100),
        }
    }
}

/// Control strings used by the LED programs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelConfig {
    /// Layout lit by the "controls" program, e.g. `"joy4way - 2P - 6Bt"`
    pub input_controls: String,

    /// `|`-separated LED names highlighted on the game list
    pub list_controls: String,

    /// `|`-separated LED names highlighted in menus
    pub menu_controls: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            input_controls: "joy4way - 1P - 4Bt".to_string(),
            list_controls: "joy1|start1|bt1-1|bt1-2|dial1|joy2|start2|extra1|side1|side2"
                .to_string(),
            menu_controls: "joy1|start1|bt1-1|bt1-2|dial1|start2|extra1|side1|side2".to_string(),
        }
    }
}

impl SmartAsdConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| SmartAsdError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| SmartAsdError::Config {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        let config = Self::from_toml_str(&text).map_err(|e| match e {
            SmartAsdError::Config { message } => SmartAsdError::Config {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })?;
        debug!(path = %path.display(), ?config, "Loaded configuration");
        Ok(config)
    }

    /// Reject values the driver cannot use.
    pub fn validate(&self) -> Result<()> {
        if self.device.name.trim().is_empty() {
            return Err(SmartAsdError::Config {
                message: "device.name must not be empty (use \"*\" for any device)".to_string(),
            });
        }
        if self.device.attach_retry.is_zero() {
            return Err(SmartAsdError::Config {
                message: "device.attach_retry must be greater than zero".to_string(),
            });
        }
        if i32::try_from(self.device.read_timeout.as_millis()).is_err() {
            return Err(SmartAsdError::Config {
                message: format!(
                    "device.read_timeout {:?} exceeds i32::MAX milliseconds",
                    self.device.read_timeout
                ),
            });
        }
        Ok(())
    }
}
