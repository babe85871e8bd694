//! Command execution against a controller.

use core::fmt::{Display, Write};

use crate::error::{Error, Result};
use crate::motor::StepperController;
use crate::port::HardwarePort;

use super::{Command, Reply};

impl<P: HardwarePort> StepperController<P> {
    /// Parse and execute one packet, returning the reply text.
    ///
    /// A packet that fails to parse mutates nothing.
    pub fn execute_command(&mut self, packet: &str) -> Reply {
        let outcome = Command::parse(packet)
            .map_err(Error::from)
            .and_then(|command| self.execute(command));

        match outcome {
            Ok(reply) => reply,
            Err(e) => {
                debug!("command rejected");
                error_reply(&e)
            }
        }
    }

    /// Execute a parsed command.
    ///
    /// # Errors
    ///
    /// Returns whatever the underlying controller operation returns.
    pub fn execute(&mut self, command: Command) -> Result<Reply> {
        trace!("execute {}", command);
        match command {
            Command::EmergencyStop => self.emergency_stop()?,
            Command::Enable => self.enable()?,
            Command::Disable => self.disable()?,
            Command::FindHome => self.find_home()?,
            Command::SetHome => self.set_home_position()?,
            Command::SetLowerLimit(value) => self.set_lower_limit(value)?,
            Command::SetUpperLimit(value) => self.set_upper_limit(value)?,
            Command::SetRamp(factor) => self.set_ramp_factor(factor)?,
            Command::RotateHome => {
                self.rotate_to_home()?;
            }
            Command::RotateLowerLimit => {
                self.rotate_to_lower_limit()?;
            }
            Command::RotateUpperLimit => {
                self.rotate_to_upper_limit()?;
            }
            Command::RotateAbsolute { velocity, target } => {
                self.rotate_absolute(target, velocity)?;
            }
            Command::RotateRelative { velocity, steps } => {
                self.rotate_relative(steps, velocity)?;
            }
            Command::GetAbsolute => return Ok(text(self.absolute_position())),
            Command::GetRelative => return Ok(text(self.relative_position())),
            Command::GetLowerLimit => return Ok(text(self.lower_limit())),
            Command::GetUpperLimit => return Ok(text(self.upper_limit())),
            Command::GetRemainingTime => return Ok(text(self.remaining_time_ms())),
            Command::GetVersion => return Ok(text(self.version())),
        }
        Ok(Reply::new())
    }
}

fn text<T: Display>(value: T) -> Reply {
    let mut reply = Reply::new();
    let _ = write!(reply, "{}", value);
    reply
}

fn error_reply(error: &Error) -> Reply {
    match error {
        Error::Config(e) => text(e),
        Error::Motor(e) => text(e),
        Error::Motion(e) => text(e),
        Error::Protocol(e) => text(e),
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ControllerConfig;
    use crate::motor::{MotorState, StepperController};
    use crate::port::SimulatedPort;

    fn controller() -> StepperController<SimulatedPort> {
        StepperController::new(SimulatedPort::new(), ControllerConfig::default()).unwrap()
    }

    #[test]
    fn test_enable_and_query() {
        let mut c = controller();

        assert_eq!(c.execute_command("EN").as_str(), "");
        assert_eq!(c.state(), MotorState::Enabled);
        assert_eq!(c.execute_command("GA").as_str(), "0");
        assert_eq!(c.execute_command("GL").as_str(), "-2000000000");
        assert_eq!(c.execute_command("GT").as_str(), "0");
    }

    #[test]
    fn test_protocol_errors() {
        let mut c = controller();

        assert_eq!(c.execute_command("X").as_str(), "Bad command");
        assert_eq!(c.execute_command("ZZ").as_str(), "Unknown command");
        assert_eq!(c.execute_command("SR").as_str(), "Missing ramp value 0-9");
        assert_eq!(c.execute_command("SL").as_str(), "Missing limit value");
        assert_eq!(c.execute_command("RA12").as_str(), "Bad command");
        assert_eq!(c.state(), MotorState::Disabled);
    }

    #[test]
    fn test_controller_error_text() {
        let mut c = controller();

        assert_eq!(
            c.execute_command("RA1000500").as_str(),
            "Cannot move while disabled"
        );
        c.execute_command("EN");
        assert_eq!(
            c.execute_command("SL50").as_str(),
            "Lower limit 50 must be <= 0 and <= upper"
        );
        assert_eq!(
            c.execute_command("RR0000100").as_str(),
            "Invalid velocity 0. Must be > 0"
        );
    }

    #[test]
    fn test_version() {
        let mut c = controller();
        assert_eq!(c.execute_command("GV").as_str(), crate::VERSION);
    }
}
