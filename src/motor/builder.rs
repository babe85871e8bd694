//! Builder pattern for StepperController.

use crate::config::units::{RampFactor, StepsPerSec};
use crate::config::{ControllerConfig, HomingConfig, Polarity, TravelLimits};
use crate::error::{ConfigError, Error, Result};
use crate::port::HardwarePort;

use super::controller::StepperController;

/// Builder for creating StepperController instances.
pub struct StepperControllerBuilder<P: HardwarePort> {
    port: Option<P>,
    config: ControllerConfig,
    lower_limit: Option<i64>,
    upper_limit: Option<i64>,
}

impl<P: HardwarePort> Default for StepperControllerBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: HardwarePort> StepperControllerBuilder<P> {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            port: None,
            config: ControllerConfig::default(),
            lower_limit: None,
            upper_limit: None,
        }
    }

    /// Set the hardware port.
    pub fn port(mut self, port: P) -> Self {
        self.port = Some(port);
        self
    }

    /// Start from a loaded configuration.
    ///
    /// Limits set on the builder still take precedence.
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the controller name.
    pub fn name(mut self, name: &str) -> Self {
        if let Ok(name) = heapless::String::try_from(name) {
            self.config.name = name;
        }
        self
    }

    /// Set the lower soft limit.
    pub fn lower_limit(mut self, steps: i64) -> Self {
        self.lower_limit = Some(steps);
        self
    }

    /// Set the upper soft limit.
    pub fn upper_limit(mut self, steps: i64) -> Self {
        self.upper_limit = Some(steps);
        self
    }

    /// Set the ramp factor (0-9).
    pub fn ramp_factor(mut self, factor: RampFactor) -> Self {
        self.config.ramp_factor = factor;
        self
    }

    /// Set the per-step velocity increment of the gentlest ramp.
    pub fn ramp_scale(mut self, scale: u32) -> Self {
        self.config.ramp_scale = scale;
        self
    }

    /// Set the speed used by rotate-to-home and rotate-to-limit moves.
    pub fn homing_speed(mut self, speed: StepsPerSec) -> Self {
        self.config.homing_speed = speed;
        self
    }

    /// Set the step pulse width in microseconds.
    pub fn pulse_width_us(mut self, us: u32) -> Self {
        self.config.pulse_width_us = us;
        self
    }

    /// Set the direction setup time in microseconds.
    pub fn direction_setup_us(mut self, us: u32) -> Self {
        self.config.direction_setup_us = us;
        self
    }

    /// Set line polarity.
    pub fn polarity(mut self, polarity: Polarity) -> Self {
        self.config.polarity = polarity;
        self
    }

    /// Set homing timing.
    pub fn homing(mut self, homing: HomingConfig) -> Self {
        self.config.homing = homing;
        self
    }

    /// Build the StepperController.
    ///
    /// # Errors
    ///
    /// Returns an error if no port was given, the configuration is invalid,
    /// or the outputs cannot be driven to their safe levels.
    pub fn build(self) -> Result<StepperController<P>> {
        let port = self
            .port
            .ok_or(Error::Config(ConfigError::MissingField("port")))?;

        let mut config = self.config;
        if self.lower_limit.is_some() || self.upper_limit.is_some() {
            config.limits = TravelLimits::new(
                self.lower_limit.unwrap_or(config.limits.lower()),
                self.upper_limit.unwrap_or(config.limits.upper()),
            )?;
        }

        StepperController::new(port, config)
    }
}
