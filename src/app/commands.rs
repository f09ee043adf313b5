//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (operator
//! console, settings reload) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::app::mode::OperatingMode;
use crate::config::SystemConfig;
use crate::control::policy::Valve;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Switch operating mode.
    SetMode(OperatingMode),

    /// Flip one valve.  Refused in automatic mode.
    ToggleValve(Valve),

    /// Set one valve explicitly.  Refused in automatic mode.
    SetValve { valve: Valve, open: bool },

    /// Set the fan speed (clamped to 100).  Refused in automatic mode.
    SetFanSpeed(u8),

    /// Change the setpoint.  Finite values are clamped into range.
    SetTargetTemperature(f32),

    /// Hot-reload configuration.
    UpdateConfig(SystemConfig),

    /// Persist the current config on the next auto-save check.
    SaveConfig,
}

/// Error returned by [`parse_command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCommandError {
    Empty,
    UnknownVerb,
    MissingArgument(&'static str),
    InvalidArgument(&'static str),
}

impl core::fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty command"),
            Self::UnknownVerb => write!(f, "unknown command"),
            Self::MissingArgument(what) => write!(f, "missing {}", what),
            Self::InvalidArgument(what) => write!(f, "invalid {}", what),
        }
    }
}

impl std::error::Error for ParseCommandError {}

fn parse_valve(s: &str) -> Result<Valve, ParseCommandError> {
    match s {
        "valve1" | "1" | "main" => Ok(Valve::Main),
        "valve2" | "2" | "secondary" => Ok(Valve::Secondary),
        _ => Err(ParseCommandError::InvalidArgument("valve")),
    }
}

/// Parse one operator console line, e.g. `mode automatic`, `toggle valve1`,
/// `valve valve2 open`, `fan 60`, `target 25.5`, `save`.
pub fn parse_command(line: &str) -> Result<AppCommand, ParseCommandError> {
    let mut words = line.split_whitespace();
    let verb = words.next().ok_or(ParseCommandError::Empty)?;
    let mut arg = |what| words.next().ok_or(ParseCommandError::MissingArgument(what));

    match verb {
        "mode" => arg("mode")?
            .parse()
            .map(AppCommand::SetMode)
            .map_err(|_| ParseCommandError::InvalidArgument("mode")),
        "toggle" => parse_valve(arg("valve")?).map(AppCommand::ToggleValve),
        "valve" => {
            let valve = parse_valve(arg("valve")?)?;
            let open = match arg("state")? {
                "open" | "on" => true,
                "close" | "closed" | "off" => false,
                _ => return Err(ParseCommandError::InvalidArgument("state")),
            };
            Ok(AppCommand::SetValve { valve, open })
        }
        "fan" => arg("percent")?
            .parse::<u8>()
            .map(AppCommand::SetFanSpeed)
            .map_err(|_| ParseCommandError::InvalidArgument("percent")),
        "target" => arg("temperature")?
            .parse::<f32>()
            .map(AppCommand::SetTargetTemperature)
            .map_err(|_| ParseCommandError::InvalidArgument("temperature")),
        "save" => Ok(AppCommand::SaveConfig),
        _ => Err(ParseCommandError::UnknownVerb),
    }
}
