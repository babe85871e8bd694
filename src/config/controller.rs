//! Controller configuration from TOML.

use heapless::String;
use serde::Deserialize;

use super::limits::TravelLimits;
use super::units::{RampFactor, StepsPerSec};

/// Complete controller configuration.
///
/// Every field has a default, so an empty TOML document is a valid
/// configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Human-readable name (max 32 chars).
    pub name: String<32>,

    /// Soft travel limits in steps.
    pub limits: TravelLimits,

    /// Velocity ramp factor (0 = none, 1 = steepest, 9 = gentlest).
    pub ramp_factor: RampFactor,

    /// Velocity increment per step for ramp factor 9, in steps/s.
    /// Factor `r` uses `ramp_scale × (10 − r)`.
    pub ramp_scale: u32,

    /// Speed for rotate-to-home and rotate-to-limit moves.
    #[serde(rename = "homing_speed_steps_per_sec")]
    pub homing_speed: StepsPerSec,

    /// Width of the step pulse in microseconds.
    pub pulse_width_us: u32,

    /// Time the direction line must settle before the first pulse.
    pub direction_setup_us: u32,

    /// Electrical polarity of the driver and switch lines.
    pub polarity: Polarity,

    /// Homing sequence timing.
    pub homing: HomingConfig,
}

/// Electrical polarity of the driver and switch lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Polarity {
    /// Driver is enabled by a low level on the enable line.
    pub enable_active_low: bool,

    /// Positive motion drives the direction line high instead of low.
    pub invert_direction: bool,

    /// Limit switches read low when triggered (pulled-up inputs).
    pub switch_active_low: bool,
}

/// Homing sequence timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HomingConfig {
    /// Interval between steps while seeking the switch.
    pub seek_interval_us: u32,

    /// Interval between steps while backing off the switch.
    pub backoff_interval_us: u32,

    /// Extra steps taken after the switch releases.
    pub clearance_steps: u16,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            name: String::try_from("motor").unwrap_or_default(),
            limits: TravelLimits::default(),
            ramp_factor: RampFactor::default(),
            ramp_scale: 10,
            homing_speed: StepsPerSec(200),
            pulse_width_us: 2,
            direction_setup_us: 10,
            polarity: Polarity::default(),
            homing: HomingConfig::default(),
        }
    }
}

impl Default for Polarity {
    fn default() -> Self {
        Self {
            enable_active_low: true,
            invert_direction: false,
            switch_active_low: true,
        }
    }
}

impl Default for HomingConfig {
    fn default() -> Self {
        Self {
            seek_interval_us: 5_000,
            backoff_interval_us: 50_000,
            clearance_steps: 10,
        }
    }
}

impl ControllerConfig {
    /// Velocity increment per step for the configured ramp factor.
    #[inline]
    pub fn velocity_increment(&self) -> u32 {
        self.ramp_factor.velocity_increment(self.ramp_scale)
    }
}
