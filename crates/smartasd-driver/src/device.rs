//! Core device abstraction for SmartASD boards.
//!
//! This module provides the main [`SmartAsdDevice`] type which wraps a
//! driver handle with RAII semantics, serialised access and the status to
//! error mapping.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use smartapi_sys::smart_input;
use tracing::{debug, info, warn};

use crate::api::{DeviceId, Operation, SmartApi, Status, STATUS_OK};
use crate::discovery::{self, DeviceInfo};
use crate::error::{Result, SmartAsdError};
use crate::input::InputSnapshot;
use crate::output::{OutputWrite, ALL_CHANNELS};

/// Mutable per-handle state. Holding the lock also serialises driver calls.
#[derive(Debug)]
struct HandleState {
    open: bool,
    /// Last output word written successfully
    outputs: u32,
}

/// Internal state shared between clones of a device.
struct DeviceInner {
    driver: Arc<dyn SmartApi>,
    info: DeviceInfo,
    /// SmartASD handles are not documented as thread-safe; every driver
    /// call on this handle happens with this lock held.
    state: Mutex<HandleState>,
}

impl DeviceInner {
    fn label(&self) -> String {
        self.info.display_name().to_string()
    }
}

impl Drop for DeviceInner {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.open {
            debug!(device = %self.info.id, name = self.info.display_name(), "Closing SmartASD device on drop");
            self.driver.close(self.info.id);
            state.open = false;
        }
    }
}

/// A safe wrapper around an open SmartASD device.
///
/// The device is closed either explicitly with [`close`](Self::close) or
/// when the last clone is dropped. Once closed, every operation on any
/// clone fails with [`SmartAsdError::DeviceClosed`].
///
/// # Thread Safety
///
/// `SmartAsdDevice` is `Send` and `Sync`. Calls from several threads are
/// serialised per device, so at most one driver call is in flight on a
/// handle. A blocking [`get_all`](Self::get_all) therefore delays writes on
/// the same device until it returns.
#[derive(Clone)]
pub struct SmartAsdDevice {
    inner: Arc<DeviceInner>,
}

impl SmartAsdDevice {
    /// Open a device found by a scan.
    ///
    /// # Errors
    ///
    /// Returns [`SmartAsdError::OpenFailed`] with the raw status when the
    /// driver refuses to open the device.
    pub fn open(driver: Arc<dyn SmartApi>, info: &DeviceInfo) -> Result<Self> {
        let code = driver.open(info.id);
        if code != STATUS_OK {
            warn!(device = %info.id, name = info.display_name(), code, "SmartOpen failed");
            return Err(SmartAsdError::OpenFailed {
                device: info.display_name().to_string(),
                code,
            });
        }

        info!(
            device = %info.id,
            name = info.display_name(),
            backend = driver.backend(),
            "Opened SmartASD device"
        );

        Ok(Self {
            inner: Arc::new(DeviceInner {
                driver,
                info: info.clone(),
                state: Mutex::new(HandleState {
                    open: true,
                    outputs: 0,
                }),
            }),
        })
    }

    /// Scan for the first device matching `pattern` (name or `"*"`) and open it.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use smartasd_driver::{SimulatedDriver, SmartAsdDevice};
    ///
    /// let sim = Arc::new(SimulatedDriver::with_boards(["SmartASD A", "SmartASD B"]));
    /// let device = SmartAsdDevice::attach(sim, "SmartASD B")?;
    /// assert_eq!(device.name(), "SmartASD B");
    /// # Ok::<(), smartasd_driver::SmartAsdError>(())
    /// ```
    pub fn attach(driver: Arc<dyn SmartApi>, pattern: &str) -> Result<Self> {
        let info = discovery::find(driver.as_ref(), pattern)?;
        Self::open(driver, &info)
    }

    /// Driver handle of this device.
    pub fn id(&self) -> DeviceId {
        self.inner.info.id
    }

    /// Name reported by the driver at scan time.
    pub fn name(&self) -> &str {
        self.inner.info.display_name()
    }

    /// Scan information this device was opened from.
    pub fn info(&self) -> &DeviceInfo {
        &self.inner.info
    }

    /// Whether the handle is still open.
    pub fn is_open(&self) -> bool {
        self.inner.state.lock().open
    }

    /// Last output word written through this handle (0 after open).
    ///
    /// The driver has no call to read outputs back, so this is the binding's
    /// own record of what it wrote.
    pub fn outputs(&self) -> u32 {
        self.inner.state.lock().outputs
    }

    /// Run `f` with exclusive access to the open handle.
    fn with_handle<R>(
        &self,
        f: impl FnOnce(&dyn SmartApi, DeviceId, &mut HandleState) -> Result<R>,
    ) -> Result<R> {
        let mut state = self.inner.state.lock();
        if !state.open {
            return Err(SmartAsdError::DeviceClosed {
                device: self.inner.label(),
            });
        }
        f(self.inner.driver.as_ref(), self.inner.info.id, &mut state)
    }

    fn check(&self, operation: Operation, code: Status) -> Result<()> {
        if code == STATUS_OK {
            return Ok(());
        }
        warn!(device = %self.id(), name = self.name(), %operation, code, "Driver call failed");
        Err(SmartAsdError::Driver {
            operation,
            device: self.inner.label(),
            code,
        })
    }

    /// Write the bits of `state` selected by `mask`; other outputs keep
    /// their value.
    pub fn set_all(&self, state: u32, mask: u32) -> Result<()> {
        self.write(OutputWrite::new(state, mask))
    }

    /// Apply an [`OutputWrite`].
    pub fn write(&self, write: OutputWrite) -> Result<()> {
        self.with_handle(|driver, id, handle| {
            let code = driver.set_all(id, write.state, write.mask);
            self.check(Operation::SetAll, code)?;
            handle.outputs = write.apply(handle.outputs);
            debug!(device = %id, state = write.state, mask = write.mask, outputs = handle.outputs, "SmartSetAll");
            Ok(())
        })
    }

    /// Replace the whole output word.
    pub fn set_outputs(&self, state: u32) -> Result<()> {
        self.set_all(state, ALL_CHANNELS)
    }

    /// Switch output channel `channel` (0..=31).
    pub fn set_single(&self, channel: u32, on: bool) -> Result<()> {
        let write = OutputWrite::channel(channel, on)?;
        self.with_handle(|driver, id, handle| {
            // channel < 32 was checked above
            let code = driver.set_single(id, channel as i32, i32::from(on));
            self.check(Operation::SetSingle, code)?;
            handle.outputs = write.apply(handle.outputs);
            debug!(device = %id, channel, on, "SmartSetSingle");
            Ok(())
        })
    }

    /// Read a fresh input snapshot, blocking up to `timeout`.
    ///
    /// The driver waits in whole milliseconds, so `timeout` is truncated;
    /// anything below one millisecond polls. A failure after waiting at
    /// least the truncated timeout is reported as [`SmartAsdError::Timeout`],
    /// an earlier one as [`SmartAsdError::Driver`].
    pub fn get_all(&self, timeout: Duration) -> Result<InputSnapshot> {
        let timeout_ms =
            i32::try_from(timeout.as_millis()).map_err(|_| SmartAsdError::InvalidArgument {
                message: format!("timeout {:?} exceeds i32::MAX milliseconds", timeout),
            })?;
        let requested = Duration::from_millis(u64::from(timeout_ms.unsigned_abs()));

        self.with_handle(|driver, id, _| {
            let mut raw = smart_input::default();
            let started = Instant::now();
            let code = driver.get_all(id, &mut raw, timeout_ms);
            if code == STATUS_OK {
                return Ok(InputSnapshot::from(raw));
            }
            if started.elapsed() >= requested {
                debug!(device = %id, timeout_ms, code, "SmartGetAll timed out");
                return Err(SmartAsdError::Timeout {
                    device: self.inner.label(),
                    timeout: requested,
                    code,
                });
            }
            self.check(Operation::GetAll, code).map(|()| InputSnapshot::default())
        })
    }

    /// Close the device. Further operations on any clone are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`SmartAsdError::DeviceClosed`] if the device was already closed.
    pub fn close(&self) -> Result<()> {
        self.with_handle(|driver, id, handle| {
            driver.close(id);
            handle.open = false;
            info!(device = %id, name = self.name(), "Closed SmartASD device");
            Ok(())
        })
    }
}

impl std::fmt::Debug for SmartAsdDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmartAsdDevice")
            .field("id", &self.inner.info.id)
            .field("name", &self.inner.info.name)
            .field("backend", &self.inner.driver.backend())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::simulator::SimulatedDriver;

    fn attach_sim() -> (Arc<SimulatedDriver>, SmartAsdDevice) {
        let sim = Arc::new(SimulatedDriver::with_boards(["board"]));
        let device = SmartAsdDevice::attach(sim.clone(), "*").unwrap();
        (sim, device)
    }

    #[test]
    fn test_open_failure_maps_to_open_failed() {
        let sim = Arc::new(SimulatedDriver::with_boards(["board"]));
        sim.fail_next(Operation::Open, 5);
        let err = SmartAsdDevice::attach(sim, "*").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OpenFailed);
        assert_eq!(err.code(), Some(5));
    }

    #[test]
    fn test_shadow_tracks_writes() {
        let (_sim, device) = attach_sim();
        device.set_all(0xf0, 0xff).unwrap();
        device.set_single(0, true).unwrap();
        assert_eq!(device.outputs(), 0xf1);
    }

    #[test]
    fn test_failed_write_keeps_shadow() {
        let (sim, device) = attach_sim();
        device.set_outputs(0x3).unwrap();
        sim.fail_next(Operation::SetAll, 2);
        let err = device.set_outputs(0xff).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DriverError);
        assert_eq!(device.outputs(), 0x3);
    }

    #[test]
    fn test_invalid_channel_rejected_before_driver() {
        let (sim, device) = attach_sim();
        let err = device.set_single(32, true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(sim.call_count(Operation::SetSingle), 0);
    }

    #[test]
    fn test_early_get_all_failure_is_driver_error() {
        let (sim, device) = attach_sim();
        sim.fail_next(Operation::GetAll, 4);
        let err = device.get_all(Duration::from_secs(5)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DriverError);
    }

    #[test]
    fn test_sub_millisecond_timeout_is_timeout() {
        let (_sim, device) = attach_sim();
        for timeout in [Duration::from_micros(1900), Duration::from_micros(400)] {
            for _ in 0..20 {
                let err = device.get_all(timeout).unwrap_err();
                assert_eq!(err.kind(), ErrorKind::Timeout, "timeout {:?}", timeout);
            }
        }
    }

    #[test]
    fn test_drop_closes_handle() {
        let (sim, device) = attach_sim();
        let id = device.id();
        let clone = device.clone();
        drop(device);
        assert!(sim.is_open(id));
        drop(clone);
        assert!(!sim.is_open(id));
    }
}
