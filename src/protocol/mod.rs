//! Text command protocol.
//!
//! Packets are a two-letter code followed by an optional argument, for
//! example `RA1000-600` (rotate to -600 at up to 1000 steps/s). Every packet
//! gets exactly one [`Reply`]: empty on success, a decimal or version string
//! for queries, or an error text.
//!
//! Asynchronous move results are reported separately with [`event_reply`].

mod command;
mod dispatcher;

use core::fmt::Write;

pub use command::Command;

use crate::motor::RunEvent;

/// Maximum reply length.
pub const REPLY_CAPACITY: usize = 64;

/// Bounded reply text.
pub type Reply = heapless::String<REPLY_CAPACITY>;

/// Report string for a poll event: `RC`, `RE`, `LS` or `HC` followed by the
/// position. `None` for [`RunEvent::Idle`].
pub fn event_reply(event: &RunEvent) -> Option<Reply> {
    let (code, position) = match *event {
        RunEvent::Idle => return None,
        RunEvent::Complete { position } => ("RC", position),
        RunEvent::RangeFault { position, .. } => ("RE", position),
        RunEvent::LimitSwitch { position, .. } => ("LS", position),
        RunEvent::Homed { position } => ("HC", position),
    };

    let mut reply = Reply::new();
    // 2 + 20 chars always fits
    let _ = write!(reply, "{}{}", code, position);
    Some(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Bound;

    #[test]
    fn test_event_reply() {
        assert_eq!(event_reply(&RunEvent::Idle), None);
        assert_eq!(
            event_reply(&RunEvent::Complete { position: 1500 }).unwrap().as_str(),
            "RC1500"
        );
        assert_eq!(
            event_reply(&RunEvent::RangeFault {
                bound: Bound::Lower,
                position: -500
            })
            .unwrap()
            .as_str(),
            "RE-500"
        );
        assert_eq!(
            event_reply(&RunEvent::LimitSwitch {
                bound: Bound::Upper,
                position: 42
            })
            .unwrap()
            .as_str(),
            "LS42"
        );
        assert_eq!(
            event_reply(&RunEvent::Homed { position: 0 }).unwrap().as_str(),
            "HC0"
        );
    }
}
