//! Polled homing sequence.
//!
//! Seek toward the lower limit switch, back off until it releases, take a
//! few clearance steps, then declare home. Each poll takes at most one step,
//! so the rest of the loop stays responsive and the sequence can be
//! cancelled at any point.

use crate::config::HomingConfig;
use crate::motion::Direction;

/// Phase of the homing sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomingPhase {
    /// Stepping toward the switch until it triggers.
    Seek,
    /// Stepping away until the switch releases.
    BackOff,
    /// Extra steps clear of the switch.
    Clearance {
        /// Steps still to take.
        remaining: u16,
    },
}

/// What the controller should do on a due homing poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomingAction {
    /// Take one step in `direction`, then wait `interval_us`.
    Step {
        /// Direction of the step.
        direction: Direction,
        /// Time until the following step.
        interval_us: u32,
    },
    /// Switch the direction line; wait for it to settle before stepping.
    Reverse(Direction),
    /// Sequence finished: declare home here.
    Done,
}

/// State of one homing run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HomingSequence {
    phase: HomingPhase,
    timing: HomingConfig,
}

impl HomingSequence {
    /// Start a sequence in the seek phase.
    pub fn new(timing: HomingConfig) -> Self {
        Self {
            phase: HomingPhase::Seek,
            timing,
        }
    }

    /// Direction the seek phase moves in.
    pub const SEEK_DIRECTION: Direction = Direction::Negative;

    /// Get the current phase.
    #[inline]
    pub fn phase(&self) -> HomingPhase {
        self.phase
    }

    /// Decide the next action given the switch state, advancing the phase.
    pub fn next_action(&mut self, switch_triggered: bool) -> HomingAction {
        let away = Self::SEEK_DIRECTION.reversed();
        match self.phase {
            HomingPhase::Seek if switch_triggered => {
                self.phase = HomingPhase::BackOff;
                HomingAction::Reverse(away)
            }
            HomingPhase::Seek => HomingAction::Step {
                direction: Self::SEEK_DIRECTION,
                interval_us: self.timing.seek_interval_us,
            },
            HomingPhase::BackOff if switch_triggered => HomingAction::Step {
                direction: away,
                interval_us: self.timing.backoff_interval_us,
            },
            HomingPhase::BackOff => {
                self.phase = HomingPhase::Clearance {
                    remaining: self.timing.clearance_steps,
                };
                self.next_action(false)
            }
            HomingPhase::Clearance { remaining: 0 } => HomingAction::Done,
            HomingPhase::Clearance { remaining } => {
                self.phase = HomingPhase::Clearance {
                    remaining: remaining - 1,
                };
                HomingAction::Step {
                    direction: away,
                    interval_us: self.timing.seek_interval_us,
                }
            }
        }
    }
}
