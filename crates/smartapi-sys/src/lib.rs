//! Low-level FFI bindings for the SmartASD I/O board driver.
//!
//! This crate provides raw, unsafe bindings to `smartapi`, the vendor
//! library that enumerates SmartASD boards and exchanges input snapshots
//! and output words with them.
//!
//! # Layout
//!
//! The vendor header exists in two flavours that differ only in integer
//! spelling (`int32_t`/`int16_t` versus `int`/`short`). The structs below
//! follow the fixed-width flavour; the compile-time assertions at the bottom
//! of this file fail the build on any target where the two would diverge.
//!
//! `smart_input` starts with 32 one-bit fields that C packs into a single
//! 32-bit unit, least significant bit first:
//!
//! | Bits | Fields |
//! |------|--------|
//! | 0..=3 | `e1a`, `e1b`, `e2a`, `e2b` |
//! | 4..=15 | `d1` .. `d12` |
//! | 16..=19 | `e3a`, `e3b`, `e4a`, `e4b` |
//! | 20..=31 | `d13` .. `d24` |
//!
//! # Safety
//!
//! All functions in this crate are `unsafe` as they are direct FFI bindings.
//! For a safe wrapper, use the `smartasd-driver` crate instead.
//!
//! # Features
//!
//! - `smartapi-sdk`: Generate prototypes from `include/smartapi.h` and link
//!   the vendor library. Without this feature every entry point panics.
//!
//! # Example (unsafe)
//!
//! ```no_run
//! use smartapi_sys::*;
//!
//! unsafe {
//!     let mut node = SmartScan();
//!     while !node.is_null() {
//!         let device = (*node).device;
//!         if SmartOpen(device) == SMART_OK {
//!             SmartSetAll(device, 0, 0xFFFF_FFFF);
//!             SmartClose(device);
//!         }
//!         node = (*node).next;
//!     }
//! }
//! ```

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(dead_code)]
#![allow(clippy::all)]

/// Wide character type used for device names.
pub type wchar_t = libc::wchar_t;

/// Opaque driver-side device record.
#[repr(C)]
pub struct smart_device {
    _unused: [u8; 0],
}

/// Handle to a device, owned by the driver.
pub type smart_dev = *mut smart_device;

/// One node of the list returned by `SmartScan`.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct smart_info {
    pub device: smart_dev,
    pub next: *mut smart_info,
}

/// Input snapshot filled by `SmartGetAll`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct smart_input {
    /// The 32 packed one-bit fields (see the crate docs for positions)
    pub bits: u32,
    pub enc1: i16,
    pub enc2: i16,
    pub enc3: i16,
    pub enc4: i16,
    pub a1: i16,
    pub a2: i16,
    pub a3: i16,
    pub a4: i16,
    pub a5: i16,
    pub a6: i16,
    pub a7: i16,
    pub a8: i16,
}

/// Status returned by every successful status-returning call.
pub const SMART_OK: i32 = 0;

/// Size in bytes of `smart_input` as laid out by the vendor compiler.
pub const SMART_INPUT_SIZE: usize = 28;

// Include the generated bindings
include!(concat!(env!("OUT_DIR"), "/bindings.rs"));

const _: () = {
    use std::mem::{align_of, offset_of, size_of};
    use std::os::raw::{c_int, c_short, c_uint};

    // Platform-width flavour must coincide with the fixed-width one
    assert!(size_of::<c_int>() == size_of::<i32>());
    assert!(size_of::<c_uint>() == size_of::<u32>());
    assert!(size_of::<c_short>() == size_of::<i16>());

    assert!(size_of::<smart_input>() == SMART_INPUT_SIZE);
    assert!(align_of::<smart_input>() == 4);
    assert!(offset_of!(smart_input, bits) == 0);
    assert!(offset_of!(smart_input, enc1) == 4);
    assert!(offset_of!(smart_input, enc4) == 10);
    assert!(offset_of!(smart_input, a1) == 12);
    assert!(offset_of!(smart_input, a8) == 26);

    assert!(offset_of!(smart_info, device) == 0);
    assert!(offset_of!(smart_info, next) == size_of::<*mut smart_device>());
};
