//! Hardware port for stepper-controller.
//!
//! The controller never touches pins directly. It talks to a
//! [`HardwarePort`], which supplies the three driver outputs, the two
//! optional limit-switch inputs, a monotonic microsecond clock and a short
//! blocking delay. Levels here are electrical; the controller applies the
//! configured polarity.

mod pins;
mod sim;

pub use embedded_hal::digital::PinState;
pub use pins::{NoSwitch, PinPort};
pub use sim::SimulatedPort;

use crate::error::Result;

/// Driver output lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputLine {
    /// Driver enable.
    Enable,
    /// Step direction.
    Direction,
    /// Step pulse.
    Step,
}

/// Limit-switch input lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputLine {
    /// Switch at the negative end of travel.
    LowerSwitch,
    /// Switch at the positive end of travel.
    UpperSwitch,
}

/// Capability interface between the controller and the hardware.
pub trait HardwarePort {
    /// Drive an output line to `state`.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::PinError` if the pin cannot be driven.
    fn set_output(&mut self, line: OutputLine, state: PinState) -> Result<()>;

    /// Read an input line.
    ///
    /// Returns `Ok(None)` when no switch is wired to that line.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::PinError` if the pin cannot be read.
    fn read_input(&mut self, line: InputLine) -> Result<Option<PinState>>;

    /// Monotonic time in microseconds.
    fn now_micros(&mut self) -> u64;

    /// Block for `us` microseconds. Used only for pulse shaping.
    fn delay_micros(&mut self, us: u32);
}

/// Monotonic microsecond time source.
pub trait MicrosClock {
    /// Microseconds since a clock-specific reference point.
    fn now_micros(&mut self) -> u64;
}

impl<C: MicrosClock> MicrosClock for &mut C {
    fn now_micros(&mut self) -> u64 {
        (**self).now_micros()
    }
}
