//! Link between the LED state machine and a SmartASD board.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::panel::LedPanel;
use super::wiring::WiringMode;
use crate::api::SmartApi;
use crate::config::SmartAsdConfig;
use crate::device::SmartAsdDevice;

/// Drives panel LEDs through a SmartASD board, attaching on demand.
///
/// Call [`update`](Self::update) periodically with a monotonic millisecond
/// clock. When no board is attached the controller scans for one at most
/// once per retry interval; output words are only written when they change.
pub struct LedController {
    driver: Arc<dyn SmartApi>,
    device_name: String,
    wiring: WiringMode,
    attach_retry: Duration,
    panel: LedPanel,
    device: Option<SmartAsdDevice>,
    next_attach: Option<u64>,
    last_written: Option<u32>,
}

impl LedController {
    pub fn new(driver: Arc<dyn SmartApi>, device_name: impl Into<String>, wiring: WiringMode) -> Self {
        Self {
            driver,
            device_name: device_name.into(),
            wiring,
            attach_retry: Duration::from_millis(5000),
            panel: LedPanel::new(wiring.six_buttons()),
            device: None,
            next_attach: None,
            last_written: None,
        }
    }

    /// Controller for the `[device]` section of a configuration.
    pub fn from_config(driver: Arc<dyn SmartApi>, config: &SmartAsdConfig) -> Self {
        Self::new(driver, config.device.name.clone(), config.device.wiring_mode)
            .with_attach_retry(config.device.attach_retry)
    }

    pub fn with_attach_retry(mut self, retry: Duration) -> Self {
        self.attach_retry = retry;
        self
    }

    pub fn wiring(&self) -> WiringMode {
        self.wiring
    }

    pub fn panel(&self) -> &LedPanel {
        &self.panel
    }

    /// Panel programs are started through the panel.
    pub fn panel_mut(&mut self) -> &mut LedPanel {
        &mut self.panel
    }

    pub fn device(&self) -> Option<&SmartAsdDevice> {
        self.device.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.device.is_some()
    }

    /// Advance the panel to `now` and push the resulting output word.
    ///
    /// Returns the output word, or `None` when wiring is disabled.
    pub fn update(&mut self, now: u64) -> Option<u32> {
        if !self.wiring.is_enabled() {
            return None;
        }

        let word = self.wiring.output_word(self.panel.tick(now));

        if self.device.is_none() && self.next_attach.map_or(true, |at| now > at) {
            let retry = u64::try_from(self.attach_retry.as_millis()).unwrap_or(u64::MAX);
            self.next_attach = Some(now.saturating_add(retry));
            self.attach();
        }

        if self.last_written != Some(word) {
            if let Some(device) = self.device.take() {
                match device.set_outputs(word) {
                    Ok(()) => {
                        self.last_written = Some(word);
                        self.device = Some(device);
                    }
                    Err(e) => {
                        warn!(device = device.name(), error = %e, "LED write failed, detaching");
                    }
                }
            }
        }

        Some(word)
    }

    fn attach(&mut self) {
        match SmartAsdDevice::attach(self.driver.clone(), &self.device_name) {
            Ok(device) => {
                info!(device = device.name(), wiring = %self.wiring, "LED panel attached");
                self.device = Some(device);
                self.last_written = None;
            }
            Err(e) => {
                debug!(pattern = %self.device_name, error = %e, "No SmartASD for LED panel");
            }
        }
    }

    /// Switch every output off and close the board.
    pub fn shutdown(&mut self) {
        if let Some(device) = self.device.take() {
            if let Err(e) = device.set_outputs(0) {
                warn!(device = device.name(), error = %e, "Failed to clear LEDs on shutdown");
            }
            self.close(device);
        }
        self.last_written = None;
    }

    /// Close the board leaving its outputs as they are.
    pub fn release(&mut self) {
        if let Some(device) = self.device.take() {
            self.close(device);
        }
        self.last_written = None;
    }

    fn close(&self, device: SmartAsdDevice) {
        if let Err(e) = device.close() {
            debug!(device = device.name(), error = %e, "LED panel already closed");
        }
    }
}

impl std::fmt::Debug for LedController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedController")
            .field("device_name", &self.device_name)
            .field("wiring", &self.wiring)
            .field("device", &self.device)
            .field("last_written", &self.last_written)
            .finish()
    }
}
