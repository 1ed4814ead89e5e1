//! Async facade over the blocking device.
//!
//! Every driver call may block (a read waits up to its timeout), so the
//! types in this module move each call onto tokio's blocking pool with
//! [`tokio::task::spawn_blocking`].
//!
//! # Example
//!
//! ```rust,ignore
//! use smartasd_driver::hal::{AsyncSmartAsd, OutputSwitch};
//!
//! let device = SmartAsdDevice::attach(driver, "*")?;
//! let mut panel = AsyncSmartAsd::new(device);
//!
//! panel.turn_on("d7").await?;
//! let inputs = panel.poll_inputs().await?;
//! ```

use anyhow::Result;
use async_trait::async_trait;

mod device;

pub use device::AsyncSmartAsd;

/// Named on/off outputs.
#[async_trait]
pub trait OutputSwitch: Send + Sync {
    /// Switch the named output on.
    async fn turn_on(&mut self, name: &str) -> Result<()>;

    /// Switch the named output off.
    async fn turn_off(&mut self, name: &str) -> Result<()>;

    /// Whether the named output is currently on.
    async fn is_on(&self, name: &str) -> Result<bool>;
}
