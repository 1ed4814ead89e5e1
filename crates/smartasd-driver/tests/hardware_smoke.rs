//! SmartASD Hardware Smoke Test Suite
//!
//! Runs against a real board through the vendor library.
//!
//! # Environment Variables
//!
//! Required:
//! - `SMARTASD_HW_TEST=1` - Enable the test suite
//!
//! Optional:
//! - `SMARTASD_DEVICE` - Device name (default: "*", first board found)
//!
//! # Running
//!
//! ```bash
//! export SMARTASD_HW_TEST=1
//! export SMARTAPI_LIB_DIR=/opt/smartasd/lib
//! cargo test --features hardware -p smartasd-driver --test hardware_smoke
//! ```
//!
//! The output test toggles every output line; disconnect anything that
//! must not be switched.

#![cfg(feature = "hardware")]

use std::env;
use std::sync::Arc;
use std::time::Duration;

use smartasd_driver::{discovery, NativeDriver, SmartAsdDevice, ANY_DEVICE};

// =============================================================================
// Test Configuration
// =============================================================================

fn hardware_test_enabled() -> bool {
    env::var("SMARTASD_HW_TEST")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(false)
}

fn device_name() -> String {
    env::var("SMARTASD_DEVICE").unwrap_or_else(|_| ANY_DEVICE.to_string())
}

macro_rules! skip_if_disabled {
    () => {
        if !hardware_test_enabled() {
            println!("SmartASD hardware test skipped (set SMARTASD_HW_TEST=1 to enable)");
            return;
        }
    };
}

fn open() -> SmartAsdDevice {
    SmartAsdDevice::attach(Arc::new(NativeDriver::new()), &device_name()).expect("attach board")
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn device_discovery_test() {
    skip_if_disabled!();

    let devices = discovery::scan(&NativeDriver::new());
    println!("Found {} SmartASD device(s)", devices.len());
    for info in &devices {
        println!("  {} at {}", info.display_name(), info.id);
    }
    assert!(!devices.is_empty(), "no SmartASD board found");
}

#[test]
fn input_read_test() {
    skip_if_disabled!();

    let device = open();
    match device.get_all(Duration::from_millis(500)) {
        Ok(snapshot) => println!("Snapshot: {:?}", snapshot),
        Err(e) if e.is_timeout() => println!("No input within 500 ms (board idle)"),
        Err(e) => panic!("read failed: {}", e),
    }
    device.close().unwrap();
}

#[test]
fn output_write_test() {
    skip_if_disabled!();

    let device = open();
    for channel in 0..32 {
        device.set_single(channel, true).unwrap();
        device.set_single(channel, false).unwrap();
    }
    device.set_all(0xFFFF_FFFF, 0).unwrap();
    device.set_all(0, u32::MAX).unwrap();
    assert_eq!(device.outputs(), 0);

    device.close().unwrap();
    assert!(device.set_all(0, 0).unwrap_err().is_closed());
}
