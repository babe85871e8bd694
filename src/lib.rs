//! # stepper-controller
//!
//! Polled step/direction stepper motor controller with embedded-hal 1.0 support.
//!
//! ## Features
//!
//! - **Non-blocking**: Every step comes from a `poll()` call; only the step pulse blocks
//! - **Drift-free timing**: Step deadlines accumulate, late polls never shift later steps
//! - **Velocity ramps**: Trapezoidal or triangular profiles from a 0-9 ramp factor
//! - **Safety**: Soft limits, limit switches, homing validity and e-stop lockout
//! - **Text protocol**: Two-letter host commands with bounded replies
//! - **no_std compatible**: Core library works without standard library
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stepper_controller::{PinPort, StepperController, event_reply};
//!
//! let port = PinPort::new(enable_pin, dir_pin, step_pin, delay, clock)
//!     .with_lower_switch(lower_switch);
//!
//! let mut motor = StepperController::builder()
//!     .port(port)
//!     .lower_limit(-10_000)
//!     .upper_limit(10_000)
//!     .build()?;
//!
//! loop {
//!     if let Some(packet) = uart.read_line() {
//!         uart.write(motor.execute_command(packet).as_bytes());
//!     }
//!     if let Some(report) = event_reply(&motor.poll()?) {
//!         uart.write(report.as_bytes());
//!     }
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): Enables TOML configuration loading and `std::error::Error`
//! - `defmt`: Enables defmt logging for embedded targets

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow large error types - necessary for no_std with heapless strings
#![allow(clippy::result_large_err)]

// Must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

// Core modules
pub mod config;
pub mod error;
pub mod motion;
pub mod motor;
pub mod port;
pub mod protocol;

// Re-exports for ergonomic API
pub use config::{validate_config, Bound, ControllerConfig, TravelLimits};
pub use error::{Error, Result};
pub use motion::{Direction, MotionPhase, RampProfile};
pub use motor::{state, MotorState, MoveOutcome, RunEvent, StepperController};
pub use port::{HardwarePort, MicrosClock, PinPort, SimulatedPort};
pub use protocol::{event_reply, Command, Reply};

// Configuration loading (std only)
#[cfg(feature = "std")]
pub use config::{load_config, parse_config};

// Unit types
pub use config::units::{RampFactor, StepsPerSec};

/// Firmware version reported by the `GV` command.
pub const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));
