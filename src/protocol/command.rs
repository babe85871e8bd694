//! Two-letter command parsing.

use core::str::FromStr;

use crate::error::ProtocolError;

/// A parsed host command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// `EN`: engage the driver and set home.
    Enable,
    /// `DI`: release the driver.
    Disable,
    /// `ES`: emergency stop.
    EmergencyStop,
    /// `FH`: start the homing sequence.
    FindHome,
    /// `SH`: set the current position as home.
    SetHome,
    /// `SL<n>`: set the lower soft limit.
    SetLowerLimit(i64),
    /// `SU<n>`: set the upper soft limit.
    SetUpperLimit(i64),
    /// `SR<d>`: set the ramp factor.
    SetRamp(u8),
    /// `RA<vvvv><n>`: rotate to an absolute position.
    RotateAbsolute {
        /// Maximum velocity in steps/s.
        velocity: u32,
        /// Target position.
        target: i64,
    },
    /// `RR<vvvv><n>`: rotate by a number of steps.
    RotateRelative {
        /// Maximum velocity in steps/s.
        velocity: u32,
        /// Signed step count.
        steps: i64,
    },
    /// `RH`: rotate to home.
    RotateHome,
    /// `RL`: rotate to the lower limit.
    RotateLowerLimit,
    /// `RU`: rotate to the upper limit.
    RotateUpperLimit,
    /// `GA`: absolute position.
    GetAbsolute,
    /// `GR`: steps moved in the current or last move.
    GetRelative,
    /// `GL`: lower limit.
    GetLowerLimit,
    /// `GU`: upper limit.
    GetUpperLimit,
    /// `GT`: estimated remaining move time in ms.
    GetRemainingTime,
    /// `GV`: firmware version.
    GetVersion,
}

/// Minimum packet length of a rotate command: code, velocity and one digit.
const ROTATE_MIN_LEN: usize = 7;

/// Width of the fixed velocity field in rotate commands.
const VELOCITY_DIGITS: usize = 4;

impl Command {
    /// Parse one packet.
    ///
    /// Trailing whitespace and line terminators are ignored. Argument-less
    /// commands ignore anything after their code.
    pub fn parse(packet: &str) -> Result<Self, ProtocolError> {
        let packet = packet.trim_end();
        if packet.len() < 2 {
            return Err(ProtocolError::BadCommand);
        }
        let code = packet.get(..2).ok_or(ProtocolError::UnknownCommand)?;
        let args = &packet[2..];

        let command = match code {
            "ES" => Command::EmergencyStop,
            "EN" => Command::Enable,
            "DI" => Command::Disable,
            "FH" => Command::FindHome,
            "SH" => Command::SetHome,
            "SL" => Command::SetLowerLimit(parse_limit(args)?),
            "SU" => Command::SetUpperLimit(parse_limit(args)?),
            "SR" => Command::SetRamp(parse_ramp(args)?),
            "RH" => Command::RotateHome,
            "RL" => Command::RotateLowerLimit,
            "RU" => Command::RotateUpperLimit,
            "RA" => {
                let (velocity, target) = parse_rotate(packet)?;
                Command::RotateAbsolute { velocity, target }
            }
            "RR" => {
                let (velocity, steps) = parse_rotate(packet)?;
                Command::RotateRelative { velocity, steps }
            }
            "GA" => Command::GetAbsolute,
            "GR" => Command::GetRelative,
            "GL" => Command::GetLowerLimit,
            "GU" => Command::GetUpperLimit,
            "GT" => Command::GetRemainingTime,
            "GV" => Command::GetVersion,
            _ => return Err(ProtocolError::UnknownCommand),
        };
        Ok(command)
    }
}

impl FromStr for Command {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_limit(args: &str) -> Result<i64, ProtocolError> {
    if args.is_empty() {
        return Err(ProtocolError::MissingLimitValue);
    }
    args.parse().map_err(|_| ProtocolError::BadLimitValue)
}

fn parse_ramp(args: &str) -> Result<u8, ProtocolError> {
    match args.as_bytes() {
        [digit @ b'0'..=b'9'] => Ok(digit - b'0'),
        _ => Err(ProtocolError::MissingRampValue),
    }
}

fn parse_rotate(packet: &str) -> Result<(u32, i64), ProtocolError> {
    if packet.len() < ROTATE_MIN_LEN {
        return Err(ProtocolError::BadCommand);
    }

    let velocity = packet
        .get(2..2 + VELOCITY_DIGITS)
        .filter(|field| field.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|field| field.parse().ok())
        .ok_or(ProtocolError::BadVelocity)?;

    let position = packet
        .get(2 + VELOCITY_DIGITS..)
        .and_then(|field| field.parse().ok())
        .ok_or(ProtocolError::BadPosition)?;

    Ok((velocity, position))
}
