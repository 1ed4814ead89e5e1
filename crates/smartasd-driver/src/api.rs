//! The driver seam.
//!
//! [`SmartApi`] mirrors the seven entry points of the vendor library one to
//! one, with raw status codes and no interpretation. The safe layer in
//! [`crate::device`] is written against this trait so it runs unchanged on
//! top of the native library ([`crate::native::NativeDriver`], feature
//! `hardware`) or the in-memory [`crate::simulator::SimulatedDriver`].

use std::fmt;

use smartapi_sys::smart_input;

/// Raw status code returned by the driver; `0` means success.
pub type Status = i32;

/// Status code for success.
pub const STATUS_OK: Status = smartapi_sys::SMART_OK;

/// Opaque identifier for a device instance issued by the driver.
///
/// For the native driver this is the `smart_dev` pointer value. It is only
/// ever handed back to the driver, never dereferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(usize);

impl DeviceId {
    /// Wrap a raw identifier.
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// The raw identifier.
    pub const fn as_raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// One of the driver entry points, for logging and error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Scan,
    Name,
    Open,
    Close,
    SetAll,
    SetSingle,
    GetAll,
}

impl Operation {
    /// Exported symbol name in the vendor library.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Scan => "SmartScan",
            Self::Name => "SmartName",
            Self::Open => "SmartOpen",
            Self::Close => "SmartClose",
            Self::SetAll => "SmartSetAll",
            Self::SetSingle => "SmartSetSingle",
            Self::GetAll => "SmartGetAll",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Raw access to a SmartASD driver.
///
/// Implementations must be callable from any thread. Callers are expected
/// to keep at most one operation in flight per device; [`crate::SmartAsdDevice`]
/// enforces that.
pub trait SmartApi: Send + Sync + 'static {
    /// Short backend name used in logs.
    fn backend(&self) -> &'static str;

    /// Enumerate attached devices in driver order.
    fn scan(&self) -> Vec<DeviceId>;

    /// Name reported for a device, `None` when the driver has none.
    fn name(&self, device: DeviceId) -> Option<String>;

    /// Open a device for I/O.
    fn open(&self, device: DeviceId) -> Status;

    /// Release driver-side resources for a device.
    fn close(&self, device: DeviceId);

    /// Write the bits of `state` selected by `mask` to the output word.
    fn set_all(&self, device: DeviceId, state: u32, mask: u32) -> Status;

    /// Switch a single output channel.
    fn set_single(&self, device: DeviceId, channel: i32, state: i32) -> Status;

    /// Fill `input` with a fresh snapshot, waiting up to `timeout_ms`.
    fn get_all(&self, device: DeviceId, input: &mut smart_input, timeout_ms: i32) -> Status;
}
