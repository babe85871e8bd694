//! Stepper motor controller.
//!
//! Owns the hardware port and every piece of motion state. All mutation goes
//! through `&mut self`, so one command or one poll is always applied as a
//! whole.

use crate::config::{validate_config, Bound, ControllerConfig, TravelLimits};
use crate::error::{MotionError, MotorError, Result};
use crate::motion::{Direction, RampProfile, StepScheduler};
use crate::port::{HardwarePort, InputLine, OutputLine, PinState};

use super::builder::StepperControllerBuilder;
use super::homing::{HomingAction, HomingPhase, HomingSequence};
use super::position::Position;
use super::state::{MotorState, Operation};

/// Outcome of one [`StepperController::poll`] call.
///
/// At most one event is reported per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunEvent {
    /// Nothing to report: not moving, not yet due, or mid-move.
    Idle,
    /// Move reached its target.
    Complete {
        /// Final absolute position.
        position: i64,
    },
    /// Next step would have left the soft range; the move was aborted.
    RangeFault {
        /// Bound that would have been crossed.
        bound: Bound,
        /// Position at which the motor stopped.
        position: i64,
    },
    /// A limit switch tripped; the move was aborted.
    LimitSwitch {
        /// Switch that tripped.
        bound: Bound,
        /// Position at which the motor stopped.
        position: i64,
    },
    /// Homing sequence finished; the current position is now home.
    Homed {
        /// Position after homing (always 0).
        position: i64,
    },
}

impl RunEvent {
    /// Whether this is [`RunEvent::Idle`].
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, RunEvent::Idle)
    }
}

/// Result of arming a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MoveOutcome {
    /// The motor is now running toward the target.
    Started,
    /// Already at the target; nothing to do.
    AtTarget,
}

/// Polled step/direction stepper controller.
///
/// Generic over the [`HardwarePort`] it drives.
pub struct StepperController<P: HardwarePort> {
    /// Hardware access.
    port: P,

    /// Configuration in force (limits and ramp factor change at runtime).
    config: ControllerConfig,

    /// State machine position.
    state: MotorState,

    /// Position bookkeeping.
    position: Position,

    /// Target of the active or last move.
    target: i64,

    /// Direction currently driven on the direction line.
    direction: Direction,

    /// Profile of the active or last move.
    profile: RampProfile,

    /// Step timing.
    scheduler: StepScheduler,

    /// Homing run, present only while homing.
    homing: Option<HomingSequence>,
}

impl<P: HardwarePort> StepperController<P> {
    /// Create a builder.
    pub fn builder() -> StepperControllerBuilder<P> {
        StepperControllerBuilder::new()
    }

    /// Create a controller and drive every output to its safe level.
    ///
    /// The controller starts `Disabled` and unhomed.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a pin cannot be
    /// driven.
    pub fn new(port: P, config: ControllerConfig) -> Result<Self> {
        validate_config(&config)?;

        let mut controller = Self {
            port,
            config,
            state: MotorState::Disabled,
            position: Position::new(),
            target: 0,
            direction: Direction::Positive,
            profile: RampProfile::default(),
            scheduler: StepScheduler::new(),
            homing: None,
        };

        let disengaged = controller.enable_level(false);
        controller.port.set_output(OutputLine::Enable, disengaged)?;
        controller.set_direction(Direction::Positive)?;
        controller.port.set_output(OutputLine::Step, PinState::Low)?;

        Ok(controller)
    }

    // ---------------------------------------------------------------------
    // State machine
    // ---------------------------------------------------------------------

    /// Engage the driver and declare the current position as home.
    ///
    /// Leaves `EStopped`, and abandons any move or homing in progress.
    pub fn enable(&mut self) -> Result<()> {
        self.state.check(Operation::Enable)?;
        self.abandon_motion();

        let engaged = self.enable_level(true);
        self.port.set_output(OutputLine::Enable, engaged)?;

        self.homing = None;
        self.scheduler.stop();
        self.transition(MotorState::Enabled);
        self.position.set_home();
        Ok(())
    }

    /// Release the driver. The home reference is lost.
    pub fn disable(&mut self) -> Result<()> {
        self.state.check(Operation::Disable)?;
        self.abandon_motion();

        self.homing = None;
        self.scheduler.stop();
        self.transition(MotorState::Disabled);
        self.position.invalidate();

        let disengaged = self.enable_level(false);
        self.port.set_output(OutputLine::Enable, disengaged)
    }

    /// Emergency stop.
    ///
    /// Drops the step line, releases the driver and locks out motion until
    /// [`enable`](Self::enable) is called. The state changes even if a pin
    /// write fails; the first pin error is returned.
    pub fn emergency_stop(&mut self) -> Result<()> {
        self.state.check(Operation::EmergencyStop)?;
        self.abandon_motion();

        self.homing = None;
        self.scheduler.stop();
        self.transition(MotorState::EStopped);
        self.position.invalidate();
        self.target = self.position.absolute();
        warn!("emergency stop at {}", self.target);

        let step = self.port.set_output(OutputLine::Step, PinState::Low);
        let disengaged = self.enable_level(false);
        let enable = self.port.set_output(OutputLine::Enable, disengaged);
        step.and(enable)
    }

    /// Declare the current position as home. Only while `Enabled`.
    pub fn set_home_position(&mut self) -> Result<()> {
        self.state.check(Operation::SetHome)?;
        self.position.set_home();
        debug!("home set");
        Ok(())
    }

    /// Replace the lower soft limit.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidLowerLimit` if `value > 0` or above the
    /// upper limit; the limit is left unchanged.
    pub fn set_lower_limit(&mut self, value: i64) -> Result<()> {
        self.state.check(Operation::SetLimit)?;
        self.config.limits.set_lower(value).map_err(|e| {
            warn!("lower limit {} rejected", value);
            e.into()
        })
    }

    /// Replace the upper soft limit.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUpperLimit` if `value < 0` or below the
    /// lower limit; the limit is left unchanged.
    pub fn set_upper_limit(&mut self, value: i64) -> Result<()> {
        self.state.check(Operation::SetLimit)?;
        self.config.limits.set_upper(value).map_err(|e| {
            warn!("upper limit {} rejected", value);
            e.into()
        })
    }

    /// Set the ramp factor (0 = none, 1 = steepest, 9 = gentlest).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidRampFactor` above 9, or
    /// `MotorError::InvalidState` while a move or homing is in progress.
    pub fn set_ramp_factor(&mut self, factor: u8) -> Result<()> {
        self.state.check(Operation::SetRamp)?;
        self.config.ramp_factor = crate::config::RampFactor::new(factor).map_err(|e| {
            warn!("ramp factor {} rejected", factor);
            e
        })?;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Moves
    // ---------------------------------------------------------------------

    /// Move to an absolute position at up to `velocity` steps/s.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::InvalidState` unless `Enabled`, and
    /// `MotionError::InvalidVelocity` for a zero velocity.
    pub fn rotate_absolute(&mut self, target: i64, velocity: u32) -> Result<MoveOutcome> {
        self.state.check(Operation::Move)?;
        if velocity == 0 {
            return Err(MotionError::InvalidVelocity(velocity).into());
        }
        self.start_move(target, velocity)
    }

    /// Move by `steps` (positive or negative) at up to `velocity` steps/s.
    ///
    /// A zero step count is a no-op.
    pub fn rotate_relative(&mut self, steps: i64, velocity: u32) -> Result<MoveOutcome> {
        self.state.check(Operation::Move)?;
        if velocity == 0 {
            return Err(MotionError::InvalidVelocity(velocity).into());
        }
        if steps == 0 {
            return Ok(MoveOutcome::AtTarget);
        }
        let target = self
            .position
            .absolute()
            .checked_add(steps)
            .ok_or(MotionError::Overflow)?;
        self.start_move(target, velocity)
    }

    /// Move to home at the homing speed.
    pub fn rotate_to_home(&mut self) -> Result<MoveOutcome> {
        self.state.check(Operation::Move)?;
        self.start_move(0, self.config.homing_speed.value())
    }

    /// Move to the lower soft limit at the homing speed.
    pub fn rotate_to_lower_limit(&mut self) -> Result<MoveOutcome> {
        self.rotate_to_limit(Bound::Lower)
    }

    /// Move to the upper soft limit at the homing speed.
    pub fn rotate_to_upper_limit(&mut self) -> Result<MoveOutcome> {
        self.rotate_to_limit(Bound::Upper)
    }

    fn rotate_to_limit(&mut self, bound: Bound) -> Result<MoveOutcome> {
        self.state.check(Operation::Move)?;
        self.start_move(self.config.limits.get(bound), self.config.homing_speed.value())
    }

    fn start_move(&mut self, target: i64, velocity: u32) -> Result<MoveOutcome> {
        let current = self.position.absolute();
        self.target = target;

        let Some(direction) = Direction::between(current, target) else {
            self.profile = RampProfile::plan(0, velocity, self.config.velocity_increment());
            return Ok(MoveOutcome::AtTarget);
        };

        self.profile = RampProfile::plan(
            target.abs_diff(current),
            velocity,
            self.config.velocity_increment(),
        );
        self.set_direction(direction)?;
        self.position.begin_move();

        let now = self.port.now_micros();
        let setup_us = self.config.direction_setup_us;
        self.scheduler.arm(now, setup_us, self.profile.start_velocity);
        self.transition(MotorState::Running);
        debug!(
            "move {} -> {}: {} steps, ramp {} down at {}",
            current,
            target,
            self.profile.total_steps,
            self.profile.ramp_steps,
            self.profile.ramp_down_step
        );
        Ok(MoveOutcome::Started)
    }

    /// Start the homing sequence against the lower limit switch.
    ///
    /// Engages the driver. The sequence is then driven by [`poll`](Self::poll)
    /// and reports [`RunEvent::Homed`] when done.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::NoHomeSwitch` without a lower switch, and
    /// `MotorError::InvalidState` unless `Disabled` or `Enabled`.
    pub fn find_home(&mut self) -> Result<()> {
        self.state.check(Operation::FindHome)?;
        if self.port.read_input(InputLine::LowerSwitch)?.is_none() {
            return Err(MotorError::NoHomeSwitch.into());
        }

        let engaged = self.enable_level(true);
        self.port.set_output(OutputLine::Enable, engaged)?;
        self.set_direction(HomingSequence::SEEK_DIRECTION)?;

        self.position.invalidate();
        self.position.begin_move();
        let now = self.port.now_micros();
        self.scheduler.arm(now, self.config.direction_setup_us, 0);
        self.homing = Some(HomingSequence::new(self.config.homing));
        self.transition(MotorState::Homing);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Polling
    // ---------------------------------------------------------------------

    /// Advance motion. Call on every pass of the main loop.
    ///
    /// Takes at most one step per call and never waits, apart from the step
    /// pulse itself.
    ///
    /// # Errors
    ///
    /// Returns `MotorError::PinError` if the port fails; the state is left
    /// as it was at the failure.
    pub fn poll(&mut self) -> Result<RunEvent> {
        match self.state {
            MotorState::Running => self.poll_move(),
            MotorState::Homing => self.poll_homing(),
            _ => Ok(RunEvent::Idle),
        }
    }

    fn poll_move(&mut self) -> Result<RunEvent> {
        if !self.position.is_homed() {
            return Ok(RunEvent::Idle);
        }

        let now = self.port.now_micros();
        if !self.scheduler.is_due(now) {
            return Ok(RunEvent::Idle);
        }

        let increment = self.direction.sign();
        let next = self.position.absolute() + increment;
        if let Some(bound) = self.config.limits.violation(next) {
            let position = self.position.absolute();
            self.stop_move();
            warn!("range fault at {}", position);
            return Ok(RunEvent::RangeFault { bound, position });
        }

        self.pulse()?;
        self.position.commit_step(increment);
        let position = self.position.absolute();

        if let Some(bound) = self.tripped_switch()? {
            self.stop_move();
            warn!("limit switch stop at {}", position);
            return Ok(RunEvent::LimitSwitch { bound, position });
        }

        if position == self.target {
            self.stop_move();
            debug!("move complete at {}", position);
            return Ok(RunEvent::Complete { position });
        }

        self.scheduler.advance(&self.profile, self.position.steps_taken());
        Ok(RunEvent::Idle)
    }

    fn poll_homing(&mut self) -> Result<RunEvent> {
        let now = self.port.now_micros();
        if !self.scheduler.is_due(now) {
            return Ok(RunEvent::Idle);
        }

        let triggered = self.switch_triggered(InputLine::LowerSwitch)?;
        let action = match self.homing.as_mut() {
            Some(homing) => homing.next_action(triggered),
            None => return Ok(RunEvent::Idle),
        };

        match action {
            HomingAction::Step {
                direction,
                interval_us,
            } => {
                self.pulse()?;
                self.position.commit_step(direction.sign());
                self.scheduler.delay_by(u64::from(interval_us));
                Ok(RunEvent::Idle)
            }
            HomingAction::Reverse(direction) => {
                self.set_direction(direction)?;
                self.scheduler.arm(now, self.config.direction_setup_us, 0);
                debug!("home switch found, backing off");
                Ok(RunEvent::Idle)
            }
            HomingAction::Done => {
                self.homing = None;
                self.transition(MotorState::Enabled);
                self.position.set_home();
                debug!("homing complete");
                Ok(RunEvent::Homed {
                    position: self.position.absolute(),
                })
            }
        }
    }

    fn abandon_motion(&mut self) {
        if self.state.is_moving() {
            warn!("{} abandoned at {}", self.state.name(), self.position.absolute());
        }
    }

    fn stop_move(&mut self) {
        self.scheduler.stop();
        self.transition(MotorState::Enabled);
    }

    fn pulse(&mut self) -> Result<()> {
        self.port.set_output(OutputLine::Step, PinState::High)?;
        self.port.delay_micros(self.config.pulse_width_us);
        self.port.set_output(OutputLine::Step, PinState::Low)
    }

    fn tripped_switch(&mut self) -> Result<Option<Bound>> {
        if self.switch_triggered(InputLine::LowerSwitch)? {
            return Ok(Some(Bound::Lower));
        }
        if self.switch_triggered(InputLine::UpperSwitch)? {
            return Ok(Some(Bound::Upper));
        }
        Ok(None)
    }

    fn switch_triggered(&mut self, line: InputLine) -> Result<bool> {
        let active = if self.config.polarity.switch_active_low {
            PinState::Low
        } else {
            PinState::High
        };
        Ok(self.port.read_input(line)? == Some(active))
    }

    fn set_direction(&mut self, direction: Direction) -> Result<()> {
        let high = (direction == Direction::Negative) != self.config.polarity.invert_direction;
        self.port.set_output(OutputLine::Direction, PinState::from(high))?;
        self.direction = direction;
        Ok(())
    }

    fn enable_level(&self, engaged: bool) -> PinState {
        PinState::from(engaged != self.config.polarity.enable_active_low)
    }

    fn transition(&mut self, next: MotorState) {
        if self.state != next {
            info!("{} -> {}", self.state.name(), next.name());
            self.state = next;
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Get the current state.
    #[inline]
    pub fn state(&self) -> MotorState {
        self.state
    }

    /// Whether the home reference is valid.
    #[inline]
    pub fn is_homed(&self) -> bool {
        self.position.is_homed()
    }

    /// Get the absolute position in steps from home.
    #[inline]
    pub fn absolute_position(&self) -> i64 {
        self.position.absolute()
    }

    /// Get the steps moved since the current or last move started.
    #[inline]
    pub fn relative_position(&self) -> i64 {
        self.position.delta()
    }

    /// Get the target of the current or last move.
    #[inline]
    pub fn target_position(&self) -> i64 {
        self.target
    }

    /// Get the lower soft limit.
    #[inline]
    pub fn lower_limit(&self) -> i64 {
        self.config.limits.lower()
    }

    /// Get the upper soft limit.
    #[inline]
    pub fn upper_limit(&self) -> i64 {
        self.config.limits.upper()
    }

    /// Get the soft limits.
    #[inline]
    pub fn limits(&self) -> &TravelLimits {
        &self.config.limits
    }

    /// Get the ramp factor.
    #[inline]
    pub fn ramp_factor(&self) -> u8 {
        self.config.ramp_factor.value()
    }

    /// Get the current velocity in steps/s.
    #[inline]
    pub fn velocity(&self) -> u32 {
        self.scheduler.velocity()
    }

    /// Get the absolute time (µs) at which the next step is due.
    #[inline]
    pub fn next_step_deadline(&self) -> u64 {
        self.scheduler.next_deadline()
    }

    /// Get the profile of the current or last move.
    #[inline]
    pub fn profile(&self) -> &RampProfile {
        &self.profile
    }

    /// Get the homing phase, if homing.
    #[inline]
    pub fn homing_phase(&self) -> Option<HomingPhase> {
        self.homing.map(|h| h.phase())
    }

    /// Estimated time until the current move completes, in milliseconds.
    ///
    /// Zero unless running. Adds a fixed 500 ms allowance for ramping.
    pub fn remaining_time_ms(&self) -> u64 {
        if self.state != MotorState::Running {
            return 0;
        }
        let remaining = self.target.abs_diff(self.position.absolute());
        let velocity = u64::from(self.profile.max_velocity.max(1));
        (remaining.saturating_mul(1000) / velocity).saturating_add(500)
    }

    /// Get the firmware version string.
    #[inline]
    pub fn version(&self) -> &'static str {
        crate::VERSION
    }

    /// Get the controller name.
    #[inline]
    pub fn name(&self) -> &str {
        self.config.name.as_str()
    }

    /// Get the configuration in force.
    #[inline]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Borrow the hardware port.
    #[inline]
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Mutably borrow the hardware port.
    #[inline]
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Release the hardware port.
    pub fn release(self) -> P {
        self.port
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, Error};
    use crate::port::SimulatedPort;

    fn controller() -> StepperController<SimulatedPort> {
        StepperController::new(SimulatedPort::new(), ControllerConfig::default()).unwrap()
    }

    fn run_until_event(c: &mut StepperController<SimulatedPort>) -> RunEvent {
        for _ in 0..1_000_000 {
            let event = c.poll().unwrap();
            if !event.is_idle() {
                return event;
            }
            c.port_mut().advance(10);
        }
        panic!("no event");
    }

    #[test]
    fn test_starts_disabled_with_safe_outputs() {
        let c = controller();

        assert_eq!(c.state(), MotorState::Disabled);
        assert!(!c.is_homed());
        assert_eq!(c.port().output(OutputLine::Enable), PinState::High);
        assert_eq!(c.port().output(OutputLine::Step), PinState::Low);
    }

    #[test]
    fn test_enable_sets_home() {
        let mut c = controller();
        c.enable().unwrap();

        assert_eq!(c.state(), MotorState::Enabled);
        assert!(c.is_homed());
        assert_eq!(c.absolute_position(), 0);
        assert_eq!(c.port().output(OutputLine::Enable), PinState::Low);
    }

    #[test]
    fn test_set_home_requires_enabled() {
        let mut c = controller();
        assert!(matches!(
            c.set_home_position(),
            Err(Error::Motor(MotorError::InvalidState { .. }))
        ));
        assert!(!c.is_homed());
    }

    #[test]
    fn test_relative_move_completes() {
        let mut c = controller();
        c.enable().unwrap();

        assert_eq!(c.rotate_relative(25, 1000).unwrap(), MoveOutcome::Started);
        assert_eq!(c.state(), MotorState::Running);
        assert_eq!(run_until_event(&mut c), RunEvent::Complete { position: 25 });
        assert_eq!(c.state(), MotorState::Enabled);
        assert_eq!(c.relative_position(), 25);
        assert_eq!(c.port().shaft_position(), 25);
    }

    #[test]
    fn test_zero_velocity_rejected() {
        let mut c = controller();
        c.enable().unwrap();

        assert_eq!(
            c.rotate_absolute(10, 0),
            Err(Error::Motion(MotionError::InvalidVelocity(0)))
        );
        assert_eq!(c.state(), MotorState::Enabled);
    }

    #[test]
    fn test_relative_overflow_rejected() {
        let mut c = controller();
        c.enable().unwrap();
        c.rotate_relative(-5, 9999).unwrap();
        run_until_event(&mut c);

        assert_eq!(
            c.rotate_relative(i64::MIN, 100),
            Err(Error::Motion(MotionError::Overflow))
        );
    }

    #[test]
    fn test_ramp_locked_while_running() {
        let mut c = controller();
        c.enable().unwrap();
        c.rotate_relative(100, 500).unwrap();

        assert!(matches!(
            c.set_ramp_factor(2),
            Err(Error::Motor(MotorError::InvalidState { .. }))
        ));
        assert_eq!(c.ramp_factor(), 5);
    }

    #[test]
    fn test_ramp_factor_validation() {
        let mut c = controller();
        assert_eq!(
            c.set_ramp_factor(10),
            Err(Error::Config(ConfigError::InvalidRampFactor(10)))
        );
        c.set_ramp_factor(0).unwrap();
        assert_eq!(c.ramp_factor(), 0);
    }

    #[test]
    fn test_remaining_time() {
        let mut c = controller();
        c.enable().unwrap();
        assert_eq!(c.remaining_time_ms(), 0);

        c.rotate_absolute(2000, 1000).unwrap();
        assert_eq!(c.remaining_time_ms(), 2500);
    }

    #[test]
    fn test_remaining_time_saturates_for_distant_target() {
        let mut c = controller();
        c.enable().unwrap();

        c.rotate_absolute(i64::MAX, 1).unwrap();
        assert_eq!(c.state(), MotorState::Running);
        assert_eq!(c.remaining_time_ms(), u64::MAX);
    }

    #[test]
    fn test_enable_abandons_homing() {
        let mut c = StepperController::new(
            SimulatedPort::new().with_lower_switch(-50),
            ControllerConfig::default(),
        )
        .unwrap();
        c.find_home().unwrap();

        c.enable().unwrap();
        assert_eq!(c.state(), MotorState::Enabled);
        assert_eq!(c.homing_phase(), None);
        assert!(c.is_homed());
    }

    #[test]
    fn test_pin_error_propagates() {
        let mut c = controller();
        c.enable().unwrap();
        c.rotate_relative(10, 100).unwrap();
        c.port_mut().advance(100);
        c.port_mut().fail_outputs(true);

        assert_eq!(c.poll(), Err(Error::Motor(MotorError::PinError)));
        assert_eq!(c.absolute_position(), 0);
    }

    #[test]
    fn test_estop_records_state_even_if_pins_fail() {
        let mut c = controller();
        c.enable().unwrap();
        c.port_mut().fail_outputs(true);

        assert!(c.emergency_stop().is_err());
        assert_eq!(c.state(), MotorState::EStopped);
        assert!(!c.is_homed());
    }
}
