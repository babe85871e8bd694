//! Error types for stepper-controller.
//!
//! Provides unified error handling across configuration, motor control,
//! move planning and the command protocol.

use core::fmt;

use crate::motor::state::{MotorState, Operation};

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all stepper-controller operations.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration parsing or validation error
    Config(ConfigError),
    /// Motor operation error
    Motor(MotorError),
    /// Move request error
    Motion(MotionError),
    /// Command protocol error
    Protocol(ProtocolError),
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    ParseError(heapless::String<128>),
    /// Required builder field was not provided
    MissingField(&'static str),
    /// Lower limit would be positive or above the upper limit
    InvalidLowerLimit {
        /// Rejected value
        value: i64,
        /// Upper limit in force
        upper: i64,
    },
    /// Upper limit would be negative or below the lower limit
    InvalidUpperLimit {
        /// Rejected value
        value: i64,
        /// Lower limit in force
        lower: i64,
    },
    /// Ramp factor outside 0-9
    InvalidRampFactor(u8),
    /// Ramp scale must be > 0
    InvalidRampScale(u32),
    /// Homing speed must be > 0
    InvalidHomingSpeed(u32),
    /// Step pulse width must be > 0
    InvalidPulseWidth(u32),
    /// Homing step interval must be > 0
    InvalidHomingInterval(u32),
    /// File I/O error (std only)
    #[cfg(feature = "std")]
    IoError(heapless::String<128>),
}

/// Motor operation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorError {
    /// Pin or port operation failed
    PinError,
    /// Operation is not permitted in the current state
    InvalidState {
        /// State the motor was in
        state: MotorState,
        /// Operation that was refused
        operation: Operation,
    },
    /// Homing requested without a lower limit switch
    NoHomeSwitch,
}

/// Move request errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError {
    /// Requested velocity must be at least 1 step/s
    InvalidVelocity(u32),
    /// Target position computation overflow
    Overflow,
}

/// Command protocol errors.
///
/// The `Display` text is what the dispatcher sends back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Packet too short for its command
    BadCommand,
    /// Two-letter code not recognised
    UnknownCommand,
    /// `SL`/`SU` without a value
    MissingLimitValue,
    /// `SL`/`SU` value is not an integer
    BadLimitValue,
    /// `SR` without exactly one digit
    MissingRampValue,
    /// Rotate velocity field is not four digits
    BadVelocity,
    /// Rotate target/step field is not an integer
    BadPosition,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e),
            Error::Motor(e) => write!(f, "Motor error: {}", e),
            Error::Motion(e) => write!(f, "Motion error: {}", e),
            Error::Protocol(e) => write!(f, "Protocol error: {}", e),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ConfigError::MissingField(name) => write!(f, "{} is required", name),
            ConfigError::InvalidLowerLimit { value, .. } => {
                write!(f, "Lower limit {} must be <= 0 and <= upper", value)
            }
            ConfigError::InvalidUpperLimit { value, .. } => {
                write!(f, "Upper limit {} must be >= 0 and >= lower", value)
            }
            ConfigError::InvalidRampFactor(v) => write!(f, "Invalid ramp factor {}. Must be 0-9", v),
            ConfigError::InvalidRampScale(v) => write!(f, "Invalid ramp scale {}. Must be > 0", v),
            ConfigError::InvalidHomingSpeed(v) => write!(f, "Invalid homing speed {}. Must be > 0", v),
            ConfigError::InvalidPulseWidth(v) => write!(f, "Invalid pulse width {}. Must be > 0", v),
            ConfigError::InvalidHomingInterval(v) => {
                write!(f, "Invalid homing interval {}. Must be > 0", v)
            }
            #[cfg(feature = "std")]
            ConfigError::IoError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl fmt::Display for MotorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotorError::PinError => write!(f, "GPIO pin operation failed"),
            MotorError::InvalidState { state, operation } => {
                write!(f, "Cannot {} while {}", operation.name(), state.name())
            }
            MotorError::NoHomeSwitch => write!(f, "No lower limit switch for homing"),
        }
    }
}

impl fmt::Display for MotionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionError::InvalidVelocity(v) => write!(f, "Invalid velocity {}. Must be > 0", v),
            MotionError::Overflow => write!(f, "Target position overflow"),
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ProtocolError::BadCommand => "Bad command",
            ProtocolError::UnknownCommand => "Unknown command",
            ProtocolError::MissingLimitValue => "Missing limit value",
            ProtocolError::BadLimitValue => "Bad limit value",
            ProtocolError::MissingRampValue => "Missing ramp value 0-9",
            ProtocolError::BadVelocity => "Bad velocity",
            ProtocolError::BadPosition => "Bad position",
        };
        f.write_str(text)
    }
}

// Conversion impls
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<MotorError> for Error {
    fn from(e: MotorError) -> Self {
        Error::Motor(e)
    }
}

impl From<MotionError> for Error {
    fn from(e: MotionError) -> Self {
        Error::Motion(e)
    }
}

impl From<ProtocolError> for Error {
    fn from(e: ProtocolError) -> Self {
        Error::Protocol(e)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(feature = "std")]
impl std::error::Error for MotorError {}

#[cfg(feature = "std")]
impl std::error::Error for MotionError {}

#[cfg(feature = "std")]
impl std::error::Error for ProtocolError {}
