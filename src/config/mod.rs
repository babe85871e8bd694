//! Configuration module for stepper-controller.
//!
//! Provides the controller configuration, its validation, and loading from
//! TOML files (with `std` feature).

mod controller;
mod limits;
#[cfg(feature = "std")]
mod loader;
pub mod units;
mod validation;

pub use controller::{ControllerConfig, HomingConfig, Polarity};
pub use limits::{Bound, TravelLimits, DEFAULT_LOWER_LIMIT, DEFAULT_UPPER_LIMIT};
pub use validation::validate_config;

#[cfg(feature = "std")]
pub use loader::{load_config, parse_config};

// Re-export unit types at config level
pub use units::{RampFactor, StepsPerSec};
