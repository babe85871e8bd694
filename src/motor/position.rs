//! Position bookkeeping.
//!
//! Tracks the absolute step count from home, the steps moved in the current
//! move, and whether the home reference can be trusted.

/// Motor position tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    /// Steps from the home reference.
    absolute: i64,
    /// Steps moved since the current or last move started.
    delta: i64,
    /// Whether `absolute` is a trusted offset from home.
    homed: bool,
}

impl Position {
    /// Create an unhomed tracker at zero.
    #[inline]
    pub const fn new() -> Self {
        Self {
            absolute: 0,
            delta: 0,
            homed: false,
        }
    }

    /// Get the absolute position in steps.
    #[inline]
    pub fn absolute(&self) -> i64 {
        self.absolute
    }

    /// Get the steps moved since the last move started.
    #[inline]
    pub fn delta(&self) -> i64 {
        self.delta
    }

    /// Number of steps taken in the current move.
    #[inline]
    pub fn steps_taken(&self) -> u64 {
        self.delta.unsigned_abs()
    }

    /// Whether the home reference is valid.
    #[inline]
    pub fn is_homed(&self) -> bool {
        self.homed
    }

    /// Commit one step of `increment` (±1).
    ///
    /// Both counters move together so a caller never sees one without the
    /// other.
    #[inline]
    pub fn commit_step(&mut self, increment: i64) {
        self.absolute += increment;
        self.delta += increment;
    }

    /// Start counting a new move.
    #[inline]
    pub fn begin_move(&mut self) {
        self.delta = 0;
    }

    /// Declare the current position as home.
    #[inline]
    pub fn set_home(&mut self) {
        self.absolute = 0;
        self.delta = 0;
        self.homed = true;
    }

    /// Drop the home reference.
    #[inline]
    pub fn invalidate(&mut self) {
        self.homed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_tracking() {
        let mut pos = Position::new();
        assert!(!pos.is_homed());

        pos.set_home();
        pos.begin_move();
        for _ in 0..5 {
            pos.commit_step(-1);
        }

        assert_eq!(pos.absolute(), -5);
        assert_eq!(pos.delta(), -5);
        assert_eq!(pos.steps_taken(), 5);

        pos.begin_move();
        pos.commit_step(1);
        assert_eq!(pos.absolute(), -4);
        assert_eq!(pos.delta(), 1);
    }

    #[test]
    fn test_set_home_is_idempotent() {
        let mut pos = Position::new();
        pos.set_home();
        pos.commit_step(1);
        pos.set_home();
        pos.set_home();

        assert_eq!(
            pos,
            Position {
                absolute: 0,
                delta: 0,
                homed: true
            }
        );

        pos.invalidate();
        assert!(!pos.is_homed());
        assert_eq!(pos.absolute(), 0);
    }
}
