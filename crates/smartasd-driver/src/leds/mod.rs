//! Arcade control panel LEDs driven through a SmartASD board.
//!
//! The panel has 32 logical LEDs (start, coin door, joystick, eight
//! buttons, spinner, trackball and side button for each of two players,
//! plus four extra buttons). [`LedPanel`] animates them; [`WiringMode`]
//! maps them to output lines; [`LedController`] keeps a board attached and
//! writes the result.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use smartasd_driver::leds::{LedController, WiringMode};
//! use smartasd_driver::SimulatedDriver;
//!
//! let sim = Arc::new(SimulatedDriver::new());
//! let id = sim.add_board("SmartASD");
//!
//! let mut leds = LedController::new(sim.clone(), "*", WiringMode::Dedicated);
//! leds.panel_mut().show_controls("joy8way - 1P - 2Bt", false, true);
//! leds.update(0);
//! assert_eq!(sim.outputs(id), Some(0b11111));
//! ```

mod controller;
pub mod frames;
pub mod layout;
mod panel;
mod wiring;

pub use controller::LedController;
pub use frames::TransitionProgram;
pub use layout::ControlLayout;
pub use panel::{BlinkStyle, FrameRate, LedPanel, Scene};
pub use wiring::WiringMode;
