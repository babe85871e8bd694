//! Configuration validation.

use crate::error::{ConfigError, Result};

use super::ControllerConfig;

/// Validate a controller configuration.
///
/// Checks:
/// - Soft limits satisfy `lower <= 0 <= upper`
/// - Ramp scale, homing speed and pulse width are positive
/// - Homing step intervals are positive
pub fn validate_config(config: &ControllerConfig) -> Result<()> {
    let limits = &config.limits;
    if limits.lower() > 0 || limits.lower() > limits.upper() {
        return Err(ConfigError::InvalidLowerLimit {
            value: limits.lower(),
            upper: limits.upper(),
        }
        .into());
    }
    if limits.upper() < 0 {
        return Err(ConfigError::InvalidUpperLimit {
            value: limits.upper(),
            lower: limits.lower(),
        }
        .into());
    }

    if config.ramp_scale == 0 {
        return Err(ConfigError::InvalidRampScale(config.ramp_scale).into());
    }

    if config.homing_speed.value() == 0 {
        return Err(ConfigError::InvalidHomingSpeed(config.homing_speed.value()).into());
    }

    if config.pulse_width_us == 0 {
        return Err(ConfigError::InvalidPulseWidth(config.pulse_width_us).into());
    }

    for interval in [config.homing.seek_interval_us, config.homing.backoff_interval_us] {
        if interval == 0 {
            return Err(ConfigError::InvalidHomingInterval(interval).into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::units::StepsPerSec;
    use crate::error::Error;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ControllerConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_ramp_scale() {
        let config = ControllerConfig {
            ramp_scale: 0,
            ..ControllerConfig::default()
        };

        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidRampScale(0)))
        ));
    }

    #[test]
    fn test_invalid_homing_speed() {
        let config = ControllerConfig {
            homing_speed: StepsPerSec(0),
            ..ControllerConfig::default()
        };

        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidHomingSpeed(0)))
        ));
    }

    #[test]
    fn test_invalid_homing_interval() {
        let mut config = ControllerConfig::default();
        config.homing.backoff_interval_us = 0;

        assert!(matches!(
            validate_config(&config),
            Err(Error::Config(ConfigError::InvalidHomingInterval(0)))
        ));
    }
}
