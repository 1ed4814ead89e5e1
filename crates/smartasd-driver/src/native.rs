//! Native backend calling into the vendor `smartapi` library.

use std::collections::HashSet;

use smartapi_sys::{smart_dev, smart_input};
use tracing::{trace, warn};

use crate::api::{DeviceId, SmartApi, Status};
use crate::wide::read_wide;

/// [`SmartApi`] implementation backed by the vendor library.
///
/// The library keeps its own global state; this type carries none.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeDriver {
    _private: (),
}

impl NativeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn raw(device: DeviceId) -> smart_dev {
        device.as_raw() as smart_dev
    }
}

impl SmartApi for NativeDriver {
    fn backend(&self) -> &'static str {
        "smartapi"
    }

    fn scan(&self) -> Vec<DeviceId> {
        let mut devices = Vec::new();
        let mut visited = HashSet::new();

        // SAFETY: no preconditions; returns null or a driver-owned list
        let mut node = unsafe { smartapi_sys::SmartScan() };

        while !node.is_null() {
            if !visited.insert(node as usize) {
                warn!("SmartScan list revisits a node, stopping traversal");
                break;
            }
            // SAFETY: node is non-null and points into the driver's list
            let info = unsafe { *node };
            if !info.device.is_null() {
                devices.push(DeviceId::from_raw(info.device as usize));
            }
            node = info.next;
        }

        // The vendor exports no free function; the list stays with the driver.
        trace!(count = devices.len(), "SmartScan");
        devices
    }

    fn name(&self, device: DeviceId) -> Option<String> {
        // SAFETY: device came from SmartScan
        let ptr = unsafe { smartapi_sys::SmartName(Self::raw(device)) };
        if ptr.is_null() {
            None
        } else {
            // SAFETY: the driver returns a NUL-terminated string
            Some(unsafe { read_wide(ptr) })
        }
    }

    fn open(&self, device: DeviceId) -> Status {
        // SAFETY: device came from SmartScan
        unsafe { smartapi_sys::SmartOpen(Self::raw(device)) }
    }

    fn close(&self, device: DeviceId) {
        // SAFETY: device came from SmartScan and is not used after this
        unsafe { smartapi_sys::SmartClose(Self::raw(device)) }
    }

    fn set_all(&self, device: DeviceId, state: u32, mask: u32) -> Status {
        // SAFETY: device is open
        unsafe { smartapi_sys::SmartSetAll(Self::raw(device), state, mask) }
    }

    fn set_single(&self, device: DeviceId, channel: i32, state: i32) -> Status {
        // SAFETY: device is open
        unsafe { smartapi_sys::SmartSetSingle(Self::raw(device), channel, state) }
    }

    fn get_all(&self, device: DeviceId, input: &mut smart_input, timeout_ms: i32) -> Status {
        // SAFETY: device is open and input is a valid, writable smart_input
        unsafe { smartapi_sys::SmartGetAll(Self::raw(device), input, timeout_ms) }
    }
}
