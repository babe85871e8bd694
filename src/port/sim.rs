//! Simulated hardware port with a virtual clock.
//!
//! Time only moves when the caller advances it (or a pulse delay runs), so
//! tests and host-side simulations are fully deterministic.

use heapless::HistoryBuffer;

use crate::error::{MotorError, Result};

use super::{HardwarePort, InputLine, OutputLine, PinState};

/// Number of pulse timestamps kept by [`SimulatedPort`].
pub const PULSE_LOG_LEN: usize = 64;

/// Deterministic port for tests and simulation.
///
/// Models a motor whose shaft follows the step pulses (direction low means
/// positive motion) and active-low limit switches that trip at fixed
/// physical positions.
#[derive(Clone)]
pub struct SimulatedPort {
    now: u64,
    enable: PinState,
    direction: PinState,
    step: PinState,
    shaft: i64,
    lower_trip: Option<i64>,
    upper_trip: Option<i64>,
    pulses: u64,
    pulse_log: HistoryBuffer<u64, PULSE_LOG_LEN>,
    fail_outputs: bool,
}

impl Default for SimulatedPort {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedPort {
    /// Create a port at time zero with no switches.
    pub fn new() -> Self {
        Self {
            now: 0,
            enable: PinState::High,
            direction: PinState::Low,
            step: PinState::Low,
            shaft: 0,
            lower_trip: None,
            upper_trip: None,
            pulses: 0,
            pulse_log: HistoryBuffer::new(),
            fail_outputs: false,
        }
    }

    /// Add a lower switch that trips at or below `position`.
    pub fn with_lower_switch(mut self, position: i64) -> Self {
        self.lower_trip = Some(position);
        self
    }

    /// Add an upper switch that trips at or above `position`.
    pub fn with_upper_switch(mut self, position: i64) -> Self {
        self.upper_trip = Some(position);
        self
    }

    /// Advance the virtual clock.
    #[inline]
    pub fn advance(&mut self, us: u64) {
        self.now += us;
    }

    /// Current virtual time.
    #[inline]
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Physical shaft position in steps since the port was created.
    #[inline]
    pub fn shaft_position(&self) -> i64 {
        self.shaft
    }

    /// Move the shaft by hand, as if the motor were turned externally.
    #[inline]
    pub fn turn_shaft(&mut self, steps: i64) {
        self.shaft += steps;
    }

    /// Total step pulses emitted.
    #[inline]
    pub fn pulses(&self) -> u64 {
        self.pulses
    }

    /// Timestamps of the most recent pulses, oldest first.
    pub fn pulse_times(&self) -> impl Iterator<Item = &u64> {
        self.pulse_log.oldest_ordered()
    }

    /// Last level driven on an output line.
    pub fn output(&self, line: OutputLine) -> PinState {
        match line {
            OutputLine::Enable => self.enable,
            OutputLine::Direction => self.direction,
            OutputLine::Step => self.step,
        }
    }

    /// Make every subsequent output write fail.
    pub fn fail_outputs(&mut self, fail: bool) {
        self.fail_outputs = fail;
    }

    fn switch_level(tripped: bool) -> PinState {
        if tripped {
            PinState::Low
        } else {
            PinState::High
        }
    }
}

impl HardwarePort for SimulatedPort {
    fn set_output(&mut self, line: OutputLine, state: PinState) -> Result<()> {
        if self.fail_outputs {
            return Err(MotorError::PinError.into());
        }

        match line {
            OutputLine::Enable => self.enable = state,
            OutputLine::Direction => self.direction = state,
            OutputLine::Step => {
                if self.step == PinState::Low && state == PinState::High {
                    self.shaft += match self.direction {
                        PinState::Low => 1,
                        PinState::High => -1,
                    };
                    self.pulses += 1;
                    self.pulse_log.write(self.now);
                }
                self.step = state;
            }
        }
        Ok(())
    }

    fn read_input(&mut self, line: InputLine) -> Result<Option<PinState>> {
        let level = match line {
            InputLine::LowerSwitch => self
                .lower_trip
                .map(|trip| Self::switch_level(self.shaft <= trip)),
            InputLine::UpperSwitch => self
                .upper_trip
                .map(|trip| Self::switch_level(self.shaft >= trip)),
        };
        Ok(level)
    }

    fn now_micros(&mut self) -> u64 {
        self.now
    }

    fn delay_micros(&mut self, us: u32) {
        self.now += u64::from(us);
    }
}
