//! Step timing.
//!
//! Deadlines accumulate from the previous deadline, never from the time the
//! poll happened to run, so a late poll delays one step without shortening
//! or shifting the ones after it.

use crate::config::units::StepsPerSec;

use super::profile::RampProfile;

/// Absolute-deadline step scheduler for one move.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepScheduler {
    /// Current velocity in steps/s.
    velocity: u32,

    /// Time at which the next step is due, in microseconds.
    next_deadline: u64,
}

impl StepScheduler {
    /// Create an idle scheduler.
    #[inline]
    pub const fn new() -> Self {
        Self {
            velocity: 0,
            next_deadline: 0,
        }
    }

    /// Start a move: first step due `setup_us` after `now`.
    #[inline]
    pub fn arm(&mut self, now: u64, setup_us: u32, start_velocity: u32) {
        self.velocity = start_velocity;
        self.next_deadline = now.saturating_add(u64::from(setup_us));
    }

    /// Whether the next step is due at `now`.
    #[inline]
    pub fn is_due(&self, now: u64) -> bool {
        now >= self.next_deadline
    }

    /// Get the current velocity in steps/s.
    #[inline]
    pub fn velocity(&self) -> u32 {
        self.velocity
    }

    /// Get the absolute deadline of the next step.
    #[inline]
    pub fn next_deadline(&self) -> u64 {
        self.next_deadline
    }

    /// Push the deadline out by a fixed interval.
    #[inline]
    pub fn delay_by(&mut self, interval_us: u64) {
        self.next_deadline = self.next_deadline.saturating_add(interval_us);
    }

    /// Advance after a committed step.
    ///
    /// Updates the velocity from `profile` and schedules the next step one
    /// period after the previous deadline.
    pub fn advance(&mut self, profile: &RampProfile, steps_taken: u64) {
        self.velocity = profile.next_velocity(self.velocity, steps_taken);
        if let Some(period) = StepsPerSec(self.velocity).interval_us() {
            self.delay_by(period);
        }
    }

    /// Reset to idle.
    #[inline]
    pub fn stop(&mut self) {
        self.velocity = 0;
    }
}
