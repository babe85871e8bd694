//! Motion module for stepper-controller.
//!
//! Provides velocity ramp planning and absolute-deadline step timing.

mod profile;
mod scheduler;

pub use profile::{Direction, MotionPhase, RampProfile};
pub use scheduler::StepScheduler;
