//! Unified error types for the greenhouse controller.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! control loop's error handling uniform.  All variants are `Copy` so they
//! can be passed through the service and scheduler without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible controller operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An operator command was refused.
    Command(CommandError),
    /// A schedule entry could not be created or stored.
    Schedule(ScheduleError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Schedule(e) => write!(f, "schedule: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Manual actuator writes are locked while the policy is in control.
    AutomaticModeActive,
    /// Setpoint was NaN or infinite.
    NonFiniteSetpoint,
    /// A runtime config update failed range checks.
    InvalidConfig(&'static str),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AutomaticModeActive => write!(f, "manual control locked in automatic mode"),
            Self::NonFiniteSetpoint => write!(f, "setpoint is not a finite number"),
            Self::InvalidConfig(reason) => write!(f, "invalid config: {reason}"),
        }
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

// ---------------------------------------------------------------------------
// Schedule errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleError {
    /// The schedule table is full.
    TableFull,
    /// An event with the same id is already scheduled.
    DuplicateId(u32),
    /// Events must run for at least one minute.
    ZeroDuration,
    /// Title or description exceeds its fixed capacity.
    TextTooLong,
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TableFull => write!(f, "schedule table full"),
            Self::DuplicateId(id) => write!(f, "event id {id} already scheduled"),
            Self::ZeroDuration => write!(f, "event duration must be at least one minute"),
            Self::TextTooLong => write!(f, "event text too long"),
        }
    }
}

impl std::error::Error for ScheduleError {}

impl From<ScheduleError> for Error {
    fn from(e: ScheduleError) -> Self {
        Self::Schedule(e)
    }
}

// ---------------------------------------------------------------------------
// Safety faults
// ---------------------------------------------------------------------------

/// Input faults raised by the safety supervisor.  While any fault is
/// latched the climate policy is not evaluated.  Faults accumulate in a
/// bitfield so that several can be tracked and cleared individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SafetyFault {
    /// Greenhouse temperature reading is NaN or infinite.
    TemperatureInvalid = 0b0000_0001,
    /// Setpoint is non-finite or outside the operating range.
    SetpointInvalid = 0b0000_0010,
    /// Wind speed reading is non-finite or negative.
    WindInvalid = 0b0000_0100,
}

impl SafetyFault {
    pub const ALL: [SafetyFault; 3] = [
        SafetyFault::TemperatureInvalid,
        SafetyFault::SetpointInvalid,
        SafetyFault::WindInvalid,
    ];

    /// Return the bitmask for this fault.
    pub const fn mask(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for SafetyFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TemperatureInvalid => write!(f, "temperature reading invalid"),
            Self::SetpointInvalid => write!(f, "setpoint out of range"),
            Self::WindInvalid => write!(f, "wind reading invalid"),
        }
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Controller-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
