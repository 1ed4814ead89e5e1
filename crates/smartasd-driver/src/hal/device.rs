//! [`OutputSwitch`] implementation and input polling for a SmartASD board.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;

use super::OutputSwitch;
use crate::device::SmartAsdDevice;
use crate::input::{InputFlags, InputSnapshot};
use crate::output::{channel_mask, OUTPUT_CHANNELS};

/// Default wait for [`AsyncSmartAsd::poll_inputs`].
const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(100);

/// A SmartASD device usable from async code.
///
/// # Channel Naming
///
/// Outputs can be addressed by:
/// - Number: `"0"` .. `"31"`
/// - Prefixed number: `"out3"`, `"ch3"`, `"channel3"`
/// - Header line name: `"d7"`, `"e1a"`, which select the output bit at the
///   same position as that line in the input word
pub struct AsyncSmartAsd {
    device: SmartAsdDevice,
    read_timeout: Duration,
}

impl AsyncSmartAsd {
    pub fn new(device: SmartAsdDevice) -> Self {
        Self {
            device,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Use `timeout` for [`poll_inputs`](Self::poll_inputs).
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Get the underlying device.
    pub fn device(&self) -> &SmartAsdDevice {
        &self.device
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    /// Read one snapshot, waiting up to the configured read timeout.
    pub async fn poll_inputs(&self) -> Result<InputSnapshot> {
        self.poll_inputs_within(self.read_timeout).await
    }

    /// Read one snapshot, waiting up to `timeout`.
    pub async fn poll_inputs_within(&self, timeout: Duration) -> Result<InputSnapshot> {
        let device = self.device.clone();
        let snapshot = tokio::task::spawn_blocking(move || device.get_all(timeout))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))??;
        Ok(snapshot)
    }

    /// Masked write of the whole output word.
    pub async fn set_all(&self, state: u32, mask: u32) -> Result<()> {
        let device = self.device.clone();
        tokio::task::spawn_blocking(move || device.set_all(state, mask))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))??;
        Ok(())
    }

    /// Close the device on the blocking pool.
    pub async fn close(self) -> Result<()> {
        let device = self.device;
        tokio::task::spawn_blocking(move || device.close())
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))??;
        Ok(())
    }

    async fn switch(&self, name: &str, on: bool) -> Result<()> {
        let channel = parse_channel(name)?;
        let device = self.device.clone();
        tokio::task::spawn_blocking(move || device.set_single(channel, on))
            .await
            .map_err(|e| anyhow::anyhow!("Task join error: {}", e))?
            .map_err(|e| anyhow::anyhow!("Switch error on '{}': {}", name, e))?;
        Ok(())
    }
}

/// Parse an output channel from its name.
///
/// Supported formats:
/// - "0", "31" - direct channel number
/// - "out3", "ch3", "channel3" - prefixed number
/// - "d7", "e1a" - line names
pub fn parse_channel(name: &str) -> Result<u32> {
    let name = name.trim();

    let numbered = name.parse::<u32>().ok().or_else(|| {
        ["out", "channel", "ch"].iter().find_map(|prefix| {
            name.to_ascii_lowercase()
                .strip_prefix(prefix)
                .and_then(|suffix| suffix.parse::<u32>().ok())
        })
    });

    let channel = match numbered {
        Some(n) => n,
        None => InputFlags::line(name)
            .and_then(InputFlags::position)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Invalid channel name '{}'. Use a number (0-{}), a prefix (out3, ch3) or a line name (d7, e1a)",
                    name,
                    OUTPUT_CHANNELS - 1
                )
            })?,
    };

    channel_mask(channel)?;
    Ok(channel)
}

#[async_trait]
impl OutputSwitch for AsyncSmartAsd {
    async fn turn_on(&mut self, name: &str) -> Result<()> {
        self.switch(name, true).await
    }

    async fn turn_off(&mut self, name: &str) -> Result<()> {
        self.switch(name, false).await
    }

    /// Reads the output shadow; the driver cannot report outputs itself.
    async fn is_on(&self, name: &str) -> Result<bool> {
        let mask = channel_mask(parse_channel(name)?)?;
        Ok(self.device.outputs() & mask != 0)
    }
}

impl std::fmt::Debug for AsyncSmartAsd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncSmartAsd")
            .field("device", &self.device)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::simulator::SimulatedDriver;

    #[test]
    fn test_parse_channel() {
        assert_eq!(parse_channel("0").unwrap(), 0);
        assert_eq!(parse_channel("31").unwrap(), 31);
        assert_eq!(parse_channel("out3").unwrap(), 3);
        assert_eq!(parse_channel("ch12").unwrap(), 12);
        assert_eq!(parse_channel("channel5").unwrap(), 5);
        assert_eq!(parse_channel("d7").unwrap(), 10);
        assert_eq!(parse_channel("D13").unwrap(), 20);
        assert_eq!(parse_channel("e1a").unwrap(), 0);
        assert_eq!(parse_channel("e4b").unwrap(), 19);
    }

    #[test]
    fn test_parse_channel_rejects() {
        assert!(parse_channel("32").is_err());
        assert!(parse_channel("out32").is_err());
        assert!(parse_channel("d25").is_err());
        assert!(parse_channel("lamp").is_err());
        assert!(parse_channel("").is_err());
    }

    #[tokio::test]
    async fn test_switch_round_trip() {
        let sim = Arc::new(SimulatedDriver::with_boards(["panel"]));
        let device = SmartAsdDevice::attach(sim.clone(), "*").unwrap();
        let id = device.id();
        let mut panel = AsyncSmartAsd::new(device);

        panel.turn_on("d7").await.unwrap();
        panel.turn_on("out0").await.unwrap();
        assert!(panel.is_on("10").await.unwrap());
        assert_eq!(sim.outputs(id), Some(0b100_0000_0001));

        panel.turn_off("d7").await.unwrap();
        assert!(!panel.is_on("d7").await.unwrap());
        assert!(panel.is_on("e1a").await.unwrap());
    }

    #[tokio::test]
    async fn test_poll_inputs() {
        let sim = Arc::new(SimulatedDriver::with_boards(["panel"]));
        let device = SmartAsdDevice::attach(sim.clone(), "*").unwrap();
        let id = device.id();
        let panel = AsyncSmartAsd::new(device).with_read_timeout(Duration::from_millis(20));

        let mut snapshot = InputSnapshot::default();
        snapshot.set(InputFlags::D24, true);
        snapshot.analog_channels_mut()[7] = -3;
        sim.push_input(id, snapshot);

        assert_eq!(panel.poll_inputs().await.unwrap(), snapshot);

        let err = panel.poll_inputs().await.unwrap_err();
        let err = err.downcast_ref::<crate::SmartAsdError>().unwrap();
        assert!(err.is_timeout());
    }
}
