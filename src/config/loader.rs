//! Configuration loading from files (std only).

use std::fs;
use std::path::Path;

use heapless::String;

use crate::error::{ConfigError, Error, Result};

use super::ControllerConfig;

/// Capacity of the message carried by parse and I/O errors.
const MESSAGE_LEN: usize = 128;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
///
/// ```rust,ignore
/// use stepper_controller::load_config;
///
/// let config = load_config("controller.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ControllerConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        let msg = format!("{}: {}", path.display(), e);
        Error::Config(ConfigError::IoError(bounded(&msg)))
    })?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<ControllerConfig> {
    let config: ControllerConfig = toml::from_str(content)
        .map_err(|e| Error::Config(ConfigError::ParseError(bounded(e.message()))))?;

    super::validation::validate_config(&config)?;

    Ok(config)
}

/// Keep as much of `text` as fits an error payload, cut on a char boundary.
fn bounded(text: &str) -> String<MESSAGE_LEN> {
    let mut end = text.len().min(MESSAGE_LEN);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    String::try_from(&text[..end]).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config.name.as_str(), "motor");
        assert_eq!(config.ramp_factor.value(), 5);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
name = "carriage"
ramp_factor = 3
ramp_scale = 20
homing_speed_steps_per_sec = 400
pulse_width_us = 5
direction_setup_us = 20

[limits]
lower_steps = -500
upper_steps = 12000

[polarity]
enable_active_low = false
invert_direction = true

[homing]
seek_interval_us = 2000
clearance_steps = 4
"#;

        let config = parse_config(toml).unwrap();
        assert_eq!(config.name.as_str(), "carriage");
        assert_eq!(config.ramp_factor.value(), 3);
        assert_eq!(config.velocity_increment(), 140);
        assert_eq!(config.homing_speed.value(), 400);
        assert_eq!(config.limits.lower(), -500);
        assert_eq!(config.limits.upper(), 12000);
        assert!(!config.polarity.enable_active_low);
        assert!(config.polarity.invert_direction);
        assert!(config.polarity.switch_active_low);
        assert_eq!(config.homing.seek_interval_us, 2000);
        assert_eq!(config.homing.backoff_interval_us, 50_000);
        assert_eq!(config.homing.clearance_steps, 4);
    }

    #[test]
    fn test_parse_rejects_bad_ramp_factor() {
        let result = parse_config("ramp_factor = 12");
        assert!(matches!(result, Err(Error::Config(ConfigError::ParseError(_)))));
    }

    #[test]
    fn test_parse_rejects_positive_lower_limit() {
        let toml = r#"
[limits]
lower_steps = 10
upper_steps = 100
"#;
        assert!(matches!(
            parse_config(toml),
            Err(Error::Config(ConfigError::ParseError(_)))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config("/nonexistent/controller.toml");
        assert!(matches!(result, Err(Error::Config(ConfigError::IoError(_)))));
    }

    #[test]
    fn test_missing_file_names_path() {
        let result = load_config("/nonexistent/turntable.toml");
        match result {
            Err(Error::Config(ConfigError::IoError(msg))) => {
                assert!(msg.starts_with("/nonexistent/turntable.toml: "));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_long_message_is_truncated_not_dropped() {
        let long = "é".repeat(100);
        let msg = bounded(&long);

        assert!(!msg.is_empty());
        assert!(msg.len() <= MESSAGE_LEN);
        assert!(long.starts_with(msg.as_str()));
        assert_eq!(bounded("short").as_str(), "short");
    }
}
