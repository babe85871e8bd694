//! Motor state machine.
//!
//! Every state-changing operation is checked against one transition table,
//! [`MotorState::permits`], before the controller touches anything.

use crate::error::MotorError;

/// Lifecycle state of the motor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorState {
    /// Driver output disabled, motor free to turn, home reference invalid.
    #[default]
    Disabled,
    /// Driver engaged and holding, no motion in progress.
    Enabled,
    /// A move is in progress.
    Running,
    /// The homing sequence is in progress.
    Homing,
    /// Emergency hold. Only `enable` leaves this state.
    EStopped,
}

/// Operations gated by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation {
    /// Engage the driver and set home.
    Enable,
    /// Release the driver.
    Disable,
    /// Emergency stop.
    EmergencyStop,
    /// Declare the current position as home.
    SetHome,
    /// Change the ramp factor.
    SetRamp,
    /// Change a soft limit.
    SetLimit,
    /// Arm a move.
    Move,
    /// Start the homing sequence.
    FindHome,
}

impl MotorState {
    /// Whether `operation` is legal from this state.
    pub const fn permits(self, operation: Operation) -> bool {
        use MotorState::*;
        use Operation::*;

        match (self, operation) {
            (_, Enable | Disable | EmergencyStop | SetLimit) => true,
            (Enabled, SetHome | Move) => true,
            (Disabled | Enabled, FindHome) => true,
            (Disabled | Enabled | EStopped, SetRamp) => true,
            _ => false,
        }
    }

    /// Check `operation` against the transition table.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::InvalidState` if the operation is not permitted.
    pub fn check(self, operation: Operation) -> Result<(), MotorError> {
        if self.permits(operation) {
            Ok(())
        } else {
            Err(MotorError::InvalidState {
                state: self,
                operation,
            })
        }
    }

    /// Whether the motor is executing a move or homing.
    #[inline]
    pub fn is_moving(self) -> bool {
        matches!(self, MotorState::Running | MotorState::Homing)
    }

    /// Get the state name as a static string.
    pub const fn name(self) -> &'static str {
        match self {
            MotorState::Disabled => "disabled",
            MotorState::Enabled => "enabled",
            MotorState::Running => "running",
            MotorState::Homing => "homing",
            MotorState::EStopped => "e-stopped",
        }
    }
}

impl Operation {
    /// Get the operation name as a static string.
    pub const fn name(self) -> &'static str {
        match self {
            Operation::Enable => "enable",
            Operation::Disable => "disable",
            Operation::EmergencyStop => "emergency stop",
            Operation::SetHome => "set home",
            Operation::SetRamp => "set ramp",
            Operation::SetLimit => "set limit",
            Operation::Move => "move",
            Operation::FindHome => "find home",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATES: [MotorState; 5] = [
        MotorState::Disabled,
        MotorState::Enabled,
        MotorState::Running,
        MotorState::Homing,
        MotorState::EStopped,
    ];

    #[test]
    fn test_only_enabled_may_move() {
        for state in ALL_STATES {
            assert_eq!(state.permits(Operation::Move), state == MotorState::Enabled);
        }
    }

    #[test]
    fn test_safety_operations_always_permitted() {
        for state in ALL_STATES {
            assert!(state.permits(Operation::Enable));
            assert!(state.permits(Operation::Disable));
            assert!(state.permits(Operation::EmergencyStop));
        }
    }

    #[test]
    fn test_ramp_locked_while_moving() {
        assert!(MotorState::Enabled.check(Operation::SetRamp).is_ok());
        assert_eq!(
            MotorState::Running.check(Operation::SetRamp),
            Err(MotorError::InvalidState {
                state: MotorState::Running,
                operation: Operation::SetRamp,
            })
        );
        assert!(MotorState::Homing.is_moving());
    }

    #[test]
    fn test_find_home_not_from_estop() {
        assert!(MotorState::Disabled.permits(Operation::FindHome));
        assert!(!MotorState::EStopped.permits(Operation::FindHome));
        assert!(!MotorState::Running.permits(Operation::FindHome));
    }
}
