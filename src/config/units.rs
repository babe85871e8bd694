//! Unit types for motion quantities.
//!
//! Type-safe step rates and the validated ramp factor, so configuration
//! values cannot be confused with positions.

use serde::Deserialize;

use crate::error::ConfigError;

/// Step rate in steps per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(transparent)]
pub struct StepsPerSec(pub u32);

impl StepsPerSec {
    /// Create a new StepsPerSec value.
    #[inline]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Interval between steps at this rate, in microseconds.
    ///
    /// Returns `None` for a zero rate.
    #[inline]
    pub const fn interval_us(self) -> Option<u64> {
        if self.0 == 0 {
            None
        } else {
            Some(1_000_000 / self.0 as u64)
        }
    }
}

/// Velocity ramp factor (0-9).
///
/// `0` selects immediate full-speed motion. `1..=9` select a ramp whose
/// per-step velocity increment shrinks as the factor grows: 1 is the
/// steepest, 9 the gentlest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RampFactor(u8);

impl RampFactor {
    /// No ramp.
    pub const NONE: Self = Self(0);
    /// Steepest ramp.
    pub const STEEPEST: Self = Self(1);
    /// Gentlest ramp.
    pub const GENTLEST: Self = Self(9);

    /// Create a new RampFactor with validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRampFactor` if the value is above 9.
    pub fn new(value: u8) -> Result<Self, ConfigError> {
        if Self::is_valid(value) {
            Ok(Self(value))
        } else {
            Err(ConfigError::InvalidRampFactor(value))
        }
    }

    /// Get the raw factor.
    #[inline]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Check if a value is valid.
    #[inline]
    pub const fn is_valid(value: u8) -> bool {
        value <= 9
    }

    /// Per-step velocity increment for this factor.
    ///
    /// `ramp_scale × (10 − factor)`, or zero for factor 0.
    #[inline]
    pub const fn velocity_increment(self, ramp_scale: u32) -> u32 {
        if self.0 == 0 {
            0
        } else {
            ramp_scale.saturating_mul(10 - self.0 as u32)
        }
    }
}

impl Default for RampFactor {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u8> for RampFactor {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for RampFactor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use core::fmt::Write;
        let value = u8::deserialize(deserializer)?;
        RampFactor::new(value).map_err(|e| {
            let mut buf = heapless::String::<128>::new();
            let _ = write!(buf, "{}", e);
            serde::de::Error::custom(buf.as_str())
        })
    }
}
