//! Soft travel limits.

use serde::Deserialize;

use crate::error::ConfigError;

/// Which end of travel a limit refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Bound {
    /// Negative end of travel.
    Lower,
    /// Positive end of travel.
    Upper,
}

/// Default lower bound in steps.
pub const DEFAULT_LOWER_LIMIT: i64 = -2_000_000_000;

/// Default upper bound in steps.
pub const DEFAULT_UPPER_LIMIT: i64 = 2_000_000_000;

/// Soft limits in steps from home.
///
/// Always satisfies `lower <= 0 <= upper`; every setter refuses a value that
/// would break it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawLimits")]
pub struct TravelLimits {
    lower: i64,
    upper: i64,
}

#[derive(Deserialize)]
struct RawLimits {
    #[serde(default = "default_lower")]
    lower_steps: i64,
    #[serde(default = "default_upper")]
    upper_steps: i64,
}

fn default_lower() -> i64 {
    DEFAULT_LOWER_LIMIT
}

fn default_upper() -> i64 {
    DEFAULT_UPPER_LIMIT
}

impl TryFrom<RawLimits> for TravelLimits {
    type Error = ConfigError;

    fn try_from(raw: RawLimits) -> Result<Self, Self::Error> {
        Self::new(raw.lower_steps, raw.upper_steps)
    }
}

impl Default for TravelLimits {
    fn default() -> Self {
        Self {
            lower: DEFAULT_LOWER_LIMIT,
            upper: DEFAULT_UPPER_LIMIT,
        }
    }
}

impl TravelLimits {
    /// Create limits, validating the sign convention.
    ///
    /// # Errors
    ///
    /// Returns `InvalidLowerLimit` if `lower > 0`, `InvalidUpperLimit` if
    /// `upper < 0`.
    pub fn new(lower: i64, upper: i64) -> Result<Self, ConfigError> {
        let mut limits = Self { lower: 0, upper: 0 };
        limits.set_upper(upper)?;
        limits.set_lower(lower)?;
        Ok(limits)
    }

    /// Get the lower bound.
    #[inline]
    pub fn lower(&self) -> i64 {
        self.lower
    }

    /// Get the upper bound.
    #[inline]
    pub fn upper(&self) -> i64 {
        self.upper
    }

    /// Replace the lower bound.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidLowerLimit` and leaves the bound unchanged
    /// if `value > 0` or `value > upper`.
    pub fn set_lower(&mut self, value: i64) -> Result<(), ConfigError> {
        if value <= 0 && value <= self.upper {
            self.lower = value;
            Ok(())
        } else {
            Err(ConfigError::InvalidLowerLimit {
                value,
                upper: self.upper,
            })
        }
    }

    /// Replace the upper bound.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUpperLimit` and leaves the bound unchanged
    /// if `value < 0` or `value < lower`.
    pub fn set_upper(&mut self, value: i64) -> Result<(), ConfigError> {
        if value >= 0 && value >= self.lower {
            self.upper = value;
            Ok(())
        } else {
            Err(ConfigError::InvalidUpperLimit {
                value,
                lower: self.lower,
            })
        }
    }

    /// Check if a position is within limits.
    #[inline]
    pub fn contains(&self, position: i64) -> bool {
        position >= self.lower && position <= self.upper
    }

    /// Which bound `position` would violate, if any.
    pub fn violation(&self, position: i64) -> Option<Bound> {
        if self.contains(position) {
            None
        } else if position < self.lower {
            Some(Bound::Lower)
        } else {
            Some(Bound::Upper)
        }
    }

    /// Position of the given bound.
    #[inline]
    pub fn get(&self, bound: Bound) -> i64 {
        match bound {
            Bound::Lower => self.lower,
            Bound::Upper => self.upper,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_read_back() {
        let mut limits = TravelLimits::default();
        limits.set_lower(-100).unwrap();
        limits.set_upper(100).unwrap();

        assert_eq!(limits.lower(), -100);
        assert_eq!(limits.upper(), 100);
    }

    #[test]
    fn test_sign_convention_rejected() {
        let mut limits = TravelLimits::new(-100, 100).unwrap();

        assert_eq!(
            limits.set_lower(50),
            Err(ConfigError::InvalidLowerLimit { value: 50, upper: 100 })
        );
        assert_eq!(
            limits.set_upper(-1),
            Err(ConfigError::InvalidUpperLimit { value: -1, lower: -100 })
        );
        assert_eq!(limits.lower(), -100);
        assert_eq!(limits.upper(), 100);
    }

    #[test]
    fn test_zero_width_range() {
        let limits = TravelLimits::new(0, 0).unwrap();
        assert!(limits.contains(0));
        assert_eq!(limits.violation(1), Some(Bound::Upper));
        assert_eq!(limits.violation(-1), Some(Bound::Lower));
    }

    #[test]
    fn test_violation() {
        let limits = TravelLimits::new(-500, 500).unwrap();

        assert_eq!(limits.violation(-500), None);
        assert_eq!(limits.violation(500), None);
        assert_eq!(limits.violation(-501), Some(Bound::Lower));
        assert_eq!(limits.violation(501), Some(Bound::Upper));
        assert_eq!(limits.get(Bound::Lower), -500);
    }
}
