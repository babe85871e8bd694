//! Motor module for stepper-controller.
//!
//! Provides the polled controller, its state machine, position tracking and
//! the homing sequence.

mod builder;
mod controller;
pub mod homing;
mod position;
pub mod state;

pub use builder::StepperControllerBuilder;
pub use controller::{MoveOutcome, RunEvent, StepperController};
pub use homing::{HomingAction, HomingPhase, HomingSequence};
pub use position::Position;
pub use state::{MotorState, Operation};
