//! Safe Rust driver for SmartASD I/O boards.
//!
//! SmartASD boards expose 24 digital inputs, four quadrature encoders and
//! eight analog channels, plus a 32-bit output word. This crate wraps the
//! vendor's `smartapi` C library (through `smartapi-sys`) with typed errors,
//! RAII handles, serialised access and an async facade.
//!
//! # Architecture
//!
//! ## Backends
//! - [`SmartApi`] - The seven driver entry points as a trait
//! - [`NativeDriver`] - Calls into the vendor library (`hardware` feature)
//! - [`SimulatedDriver`] - In-memory boards for tests and demos
//!
//! ## Device Access
//! - [`discovery`] - Scanning and name matching
//! - [`SmartAsdDevice`] - Open device handle with RAII cleanup
//! - [`InputSnapshot`] / [`InputFlags`] - Decoded `SmartGetAll` records
//! - [`OutputWrite`] - Masked output writes
//!
//! ## Higher Layers
//! - [`hal::AsyncSmartAsd`] - Async wrapper with named output switching
//! - [`leds`] - Arcade control panel LED programs
//! - [`SmartAsdConfig`] - TOML configuration
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use smartasd_driver::{discovery, SimulatedDriver, SmartAsdDevice};
//!
//! # fn example() -> anyhow::Result<()> {
//! let driver = Arc::new(SimulatedDriver::with_boards(["SmartASD"]));
//!
//! for info in discovery::scan(driver.as_ref()) {
//!     println!("{} ({})", info.display_name(), info.id);
//! }
//!
//! let device = SmartAsdDevice::attach(driver, "*")?;
//! device.set_single(3, true)?;
//! match device.get_all(Duration::from_millis(10)) {
//!     Ok(snapshot) => println!("inputs: {:?}", snapshot.flags()),
//!     Err(e) if e.is_timeout() => println!("no input yet"),
//!     Err(e) => return Err(e.into()),
//! }
//! device.close()?;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod api;
pub mod config;
pub mod device;
pub mod discovery;
pub mod error;
pub mod hal;
pub mod input;
pub mod leds;
#[cfg(feature = "hardware")]
pub mod native;
pub mod output;
pub mod simulator;
mod wide;

pub use api::{DeviceId, Operation, SmartApi, Status, STATUS_OK};
pub use config::{DeviceConfig, PanelConfig, SmartAsdConfig};
pub use device::SmartAsdDevice;
pub use discovery::{DeviceInfo, ANY_DEVICE};
pub use error::{ErrorKind, Result, SmartAsdError};
pub use hal::{AsyncSmartAsd, OutputSwitch};
pub use input::{InputFlags, InputSnapshot, Phase};
#[cfg(feature = "hardware")]
pub use native::NativeDriver;
pub use output::{OutputWrite, ALL_CHANNELS, OUTPUT_CHANNELS};
pub use simulator::SimulatedDriver;
