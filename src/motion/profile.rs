//! Velocity ramp planning.
//!
//! Provides trapezoidal and triangular step-rate profiles built from a
//! constant per-step velocity increment.

/// Direction of motor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Towards positive positions.
    Positive,
    /// Towards negative positions.
    Negative,
}

impl Direction {
    /// Direction needed to get from `from` to `to`, if they differ.
    #[inline]
    pub fn between(from: i64, to: i64) -> Option<Self> {
        match to.cmp(&from) {
            core::cmp::Ordering::Greater => Some(Direction::Positive),
            core::cmp::Ordering::Less => Some(Direction::Negative),
            core::cmp::Ordering::Equal => None,
        }
    }

    /// Get the step increment (±1).
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Positive => 1,
            Direction::Negative => -1,
        }
    }

    /// The opposite direction.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Positive => Direction::Negative,
            Direction::Negative => Direction::Positive,
        }
    }
}

/// Phase of a move after a given number of steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionPhase {
    /// Velocity grows by one increment per step.
    Accelerating,
    /// Velocity holds at the requested maximum.
    Cruising,
    /// Velocity shrinks by one increment per step.
    Decelerating,
}

/// Planned velocity profile for one move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RampProfile {
    /// Total steps in the move.
    pub total_steps: u64,

    /// Requested cruise velocity in steps/s.
    pub max_velocity: u32,

    /// Velocity change per step in steps/s (0 = no ramp).
    pub velocity_increment: u32,

    /// Steps spent accelerating.
    pub ramp_steps: u64,

    /// Step count after which deceleration begins.
    pub ramp_down_step: u64,

    /// Velocity at the first step.
    pub start_velocity: u32,
}

impl RampProfile {
    /// Plan a profile.
    ///
    /// # Arguments
    ///
    /// * `total_steps` - Unsigned length of the move
    /// * `max_velocity` - Cruise velocity in steps/s
    /// * `velocity_increment` - Per-step velocity change, 0 for no ramp
    pub fn plan(total_steps: u64, max_velocity: u32, velocity_increment: u32) -> Self {
        let (mut ramp_steps, start_velocity) = if velocity_increment == 0 {
            (0, max_velocity)
        } else {
            let ramp_steps = u64::from(max_velocity / velocity_increment);
            if ramp_steps == 0 {
                // Increment larger than the target speed: nothing to ramp.
                (0, max_velocity)
            } else {
                (ramp_steps, 0)
            }
        };

        let ramp_down_step = if total_steps > 2 * ramp_steps {
            total_steps - ramp_steps
        } else {
            // Too short to reach cruise speed: accelerate for half, decelerate for half.
            ramp_steps = total_steps / 2;
            ramp_steps
        };

        Self {
            total_steps,
            max_velocity,
            velocity_increment,
            ramp_steps,
            ramp_down_step,
            start_velocity,
        }
    }

    /// Whether the profile has no cruise segment.
    #[inline]
    pub fn is_triangular(&self) -> bool {
        self.ramp_steps == self.ramp_down_step && self.ramp_steps > 0
    }

    /// Phase after `steps_taken` steps of the move.
    pub fn phase_at(&self, steps_taken: u64) -> MotionPhase {
        if steps_taken <= self.ramp_steps && self.ramp_steps > 0 {
            MotionPhase::Accelerating
        } else if steps_taken > self.ramp_down_step {
            MotionPhase::Decelerating
        } else {
            MotionPhase::Cruising
        }
    }

    /// Velocity to use after `steps_taken` steps, given the current velocity.
    ///
    /// Never returns less than one increment (or `max_velocity` when that is
    /// smaller), so a decelerating move cannot stall.
    pub fn next_velocity(&self, current: u32, steps_taken: u64) -> u32 {
        let floor = self.velocity_increment.min(self.max_velocity).max(1);
        let next = match self.phase_at(steps_taken) {
            MotionPhase::Accelerating => current.saturating_add(self.velocity_increment),
            MotionPhase::Cruising => self.max_velocity,
            MotionPhase::Decelerating => current.saturating_sub(self.velocity_increment),
        };
        next.max(floor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trapezoid_profile() {
        let profile = RampProfile::plan(1000, 1000, 50);

        assert_eq!(profile.ramp_steps, 20);
        assert_eq!(profile.ramp_down_step, 980);
        assert_eq!(profile.start_velocity, 0);
        assert!(!profile.is_triangular());
    }

    #[test]
    fn test_triangle_profile() {
        let profile = RampProfile::plan(30, 1000, 50);

        assert_eq!(profile.ramp_steps, 15);
        assert_eq!(profile.ramp_down_step, 15);
        assert!(profile.is_triangular());
    }

    #[test]
    fn test_no_ramp() {
        let profile = RampProfile::plan(100, 800, 0);

        assert_eq!(profile.ramp_steps, 0);
        assert_eq!(profile.ramp_down_step, 100);
        assert_eq!(profile.start_velocity, 800);
        assert_eq!(profile.phase_at(1), MotionPhase::Cruising);
        assert_eq!(profile.phase_at(99), MotionPhase::Cruising);
    }

    #[test]
    fn test_increment_above_max_velocity() {
        let profile = RampProfile::plan(100, 40, 90);

        assert_eq!(profile.ramp_steps, 0);
        assert_eq!(profile.start_velocity, 40);
        assert_eq!(profile.next_velocity(40, 50), 40);
    }

    #[test]
    fn test_phase_transitions() {
        let profile = RampProfile::plan(100, 200, 20);

        assert_eq!(profile.ramp_steps, 10);
        assert_eq!(profile.phase_at(1), MotionPhase::Accelerating);
        assert_eq!(profile.phase_at(10), MotionPhase::Accelerating);
        assert_eq!(profile.phase_at(11), MotionPhase::Cruising);
        assert_eq!(profile.phase_at(90), MotionPhase::Cruising);
        assert_eq!(profile.phase_at(91), MotionPhase::Decelerating);
    }

    #[test]
    fn test_velocity_never_stalls() {
        // Odd-length triangle: the last deceleration would reach zero.
        let profile = RampProfile::plan(5, 1000, 50);
        let mut velocity = profile.start_velocity;
        for steps_taken in 1..5 {
            velocity = profile.next_velocity(velocity, steps_taken);
            assert!(velocity >= 50);
        }
    }

    #[test]
    fn test_direction() {
        assert_eq!(Direction::between(0, 10), Some(Direction::Positive));
        assert_eq!(Direction::between(0, -10), Some(Direction::Negative));
        assert_eq!(Direction::between(1000, 1000), None);
        assert_eq!(Direction::Negative.sign(), -1);
        assert_eq!(Direction::Negative.reversed(), Direction::Positive);
    }
}
