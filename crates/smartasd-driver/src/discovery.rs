//! Device enumeration.

use tracing::debug;

use crate::api::{DeviceId, SmartApi};
use crate::error::{Result, SmartAsdError};

/// Name pattern that matches the first device found.
pub const ANY_DEVICE: &str = "*";

/// A device reported by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Driver-issued handle
    pub id: DeviceId,
    /// Name reported by the driver, if any
    pub name: Option<String>,
}

impl DeviceInfo {
    /// Name for display, `"<unnamed>"` when the driver reported none.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }

    /// Whether this device answers to `pattern` (exact name or `"*"`).
    pub fn matches(&self, pattern: &str) -> bool {
        pattern == ANY_DEVICE || self.name.as_deref() == Some(pattern)
    }
}

/// Enumerate every attached device with its name, in driver order.
pub fn scan(driver: &dyn SmartApi) -> Vec<DeviceInfo> {
    let devices: Vec<DeviceInfo> = driver
        .scan()
        .into_iter()
        .map(|id| DeviceInfo {
            id,
            name: driver.name(id),
        })
        .collect();
    debug!(backend = driver.backend(), count = devices.len(), "Scanned for SmartASD devices");
    devices
}

/// First device matching `pattern`.
pub fn find(driver: &dyn SmartApi, pattern: &str) -> Result<DeviceInfo> {
    scan(driver)
        .into_iter()
        .find(|info| info.matches(pattern))
        .ok_or_else(|| SmartAsdError::DeviceNotFound {
            pattern: pattern.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::SimulatedDriver;

    #[test]
    fn test_find_by_name_and_wildcard() {
        let sim = SimulatedDriver::with_boards(["left", "right"]);
        assert_eq!(find(&sim, "right").unwrap().name.as_deref(), Some("right"));
        assert_eq!(find(&sim, ANY_DEVICE).unwrap().name.as_deref(), Some("left"));
    }

    #[test]
    fn test_find_missing() {
        let sim = SimulatedDriver::with_boards(["left"]);
        let err = find(&sim, "middle").unwrap_err();
        assert!(err.is_not_found());

        let empty = SimulatedDriver::new();
        assert!(find(&empty, ANY_DEVICE).unwrap_err().is_not_found());
    }

    #[test]
    fn test_unnamed_device() {
        let info = DeviceInfo {
            id: DeviceId::from_raw(1),
            name: None,
        };
        assert_eq!(info.display_name(), "<unnamed>");
        assert!(info.matches(ANY_DEVICE));
        assert!(!info.matches("<unnamed>"));
    }
}
