//! embedded-hal backed hardware port.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin, PinState};

use crate::error::{MotorError, Result};

use super::{HardwarePort, InputLine, MicrosClock, OutputLine};

/// Placeholder type for a limit switch that is not wired.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSwitch;

impl ErrorType for NoSwitch {
    type Error = Infallible;
}

impl InputPin for NoSwitch {
    fn is_high(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(true)
    }

    fn is_low(&mut self) -> core::result::Result<bool, Self::Error> {
        Ok(false)
    }
}

/// Hardware port over embedded-hal 1.0 pins.
///
/// Generic over:
/// - `EN`, `DIR`, `STEP`: driver outputs (must implement `OutputPin`)
/// - `LL`, `UL`: lower/upper limit switches (must implement `InputPin`)
/// - `DELAY`: Delay provider for the step pulse (must implement `DelayNs`)
/// - `CLK`: Microsecond clock (must implement [`MicrosClock`])
pub struct PinPort<EN, DIR, STEP, DELAY, CLK, LL = NoSwitch, UL = NoSwitch> {
    enable: EN,
    direction: DIR,
    step: STEP,
    lower_switch: Option<LL>,
    upper_switch: Option<UL>,
    delay: DELAY,
    clock: CLK,
}

impl<EN, DIR, STEP, DELAY, CLK> PinPort<EN, DIR, STEP, DELAY, CLK>
where
    EN: OutputPin,
    DIR: OutputPin,
    STEP: OutputPin,
    DELAY: DelayNs,
    CLK: MicrosClock,
{
    /// Create a port without limit switches.
    pub fn new(enable: EN, direction: DIR, step: STEP, delay: DELAY, clock: CLK) -> Self {
        Self {
            enable,
            direction,
            step,
            lower_switch: None,
            upper_switch: None,
            delay,
            clock,
        }
    }
}

impl<EN, DIR, STEP, DELAY, CLK, LL, UL> PinPort<EN, DIR, STEP, DELAY, CLK, LL, UL> {
    /// Wire a lower limit switch.
    pub fn with_lower_switch<P: InputPin>(
        self,
        pin: P,
    ) -> PinPort<EN, DIR, STEP, DELAY, CLK, P, UL> {
        PinPort {
            enable: self.enable,
            direction: self.direction,
            step: self.step,
            lower_switch: Some(pin),
            upper_switch: self.upper_switch,
            delay: self.delay,
            clock: self.clock,
        }
    }

    /// Wire an upper limit switch.
    pub fn with_upper_switch<P: InputPin>(
        self,
        pin: P,
    ) -> PinPort<EN, DIR, STEP, DELAY, CLK, LL, P> {
        PinPort {
            enable: self.enable,
            direction: self.direction,
            step: self.step,
            lower_switch: self.lower_switch,
            upper_switch: Some(pin),
            delay: self.delay,
            clock: self.clock,
        }
    }

    /// Release the pins and peripherals.
    pub fn release(self) -> (EN, DIR, STEP, Option<LL>, Option<UL>, DELAY, CLK) {
        (
            self.enable,
            self.direction,
            self.step,
            self.lower_switch,
            self.upper_switch,
            self.delay,
            self.clock,
        )
    }
}

fn read_switch<P: InputPin>(pin: Option<&mut P>) -> Result<Option<PinState>> {
    match pin {
        Some(pin) => {
            let high = pin.is_high().map_err(|_| MotorError::PinError)?;
            Ok(Some(PinState::from(high)))
        }
        None => Ok(None),
    }
}

impl<EN, DIR, STEP, DELAY, CLK, LL, UL> HardwarePort for PinPort<EN, DIR, STEP, DELAY, CLK, LL, UL>
where
    EN: OutputPin,
    DIR: OutputPin,
    STEP: OutputPin,
    DELAY: DelayNs,
    CLK: MicrosClock,
    LL: InputPin,
    UL: InputPin,
{
    fn set_output(&mut self, line: OutputLine, state: PinState) -> Result<()> {
        let result = match line {
            OutputLine::Enable => self.enable.set_state(state).map_err(|_| ()),
            OutputLine::Direction => self.direction.set_state(state).map_err(|_| ()),
            OutputLine::Step => self.step.set_state(state).map_err(|_| ()),
        };
        result.map_err(|_| MotorError::PinError.into())
    }

    fn read_input(&mut self, line: InputLine) -> Result<Option<PinState>> {
        match line {
            InputLine::LowerSwitch => read_switch(self.lower_switch.as_mut()),
            InputLine::UpperSwitch => read_switch(self.upper_switch.as_mut()),
        }
    }

    fn now_micros(&mut self) -> u64 {
        self.clock.now_micros()
    }

    fn delay_micros(&mut self, us: u32) {
        self.delay.delay_us(us);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};

    struct FixedClock(u64);

    impl MicrosClock for FixedClock {
        fn now_micros(&mut self) -> u64 {
            self.0
        }
    }

    #[test]
    fn test_outputs_and_switches() {
        let mut enable = PinMock::new(&[PinTransaction::set(State::Low)]);
        let mut direction = PinMock::new(&[PinTransaction::set(State::High)]);
        let mut step = PinMock::new(&[
            PinTransaction::set(State::High),
            PinTransaction::set(State::Low),
        ]);
        let mut lower = PinMock::new(&[PinTransaction::get(State::Low)]);

        let mut port = PinPort::new(
            enable.clone(),
            direction.clone(),
            step.clone(),
            NoopDelay::new(),
            FixedClock(42),
        )
        .with_lower_switch(lower.clone());

        port.set_output(OutputLine::Enable, PinState::Low).unwrap();
        port.set_output(OutputLine::Direction, PinState::High).unwrap();
        port.set_output(OutputLine::Step, PinState::High).unwrap();
        port.delay_micros(2);
        port.set_output(OutputLine::Step, PinState::Low).unwrap();

        assert_eq!(port.read_input(InputLine::LowerSwitch).unwrap(), Some(PinState::Low));
        assert_eq!(port.read_input(InputLine::UpperSwitch).unwrap(), None);
        assert_eq!(port.now_micros(), 42);

        enable.done();
        direction.done();
        step.done();
        lower.done();
    }
}
