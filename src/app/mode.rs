//! Operating mode of the controller.
//!
//! The mode decides who may write to the actuators:
//!
//! | Mode        | Valve / fan writes come from      |
//! |-------------|-----------------------------------|
//! | `Manual`    | operator commands                 |
//! | `Automatic` | the climate policy, every tick    |
//! | `Scheduled` | schedule events (and the operator)|

use core::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingMode {
    #[default]
    Manual,
    Automatic,
    Scheduled,
}

impl OperatingMode {
    /// True when the climate policy owns the actuators.
    pub fn is_automatic(self) -> bool {
        self == Self::Automatic
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Automatic => "automatic",
            Self::Scheduled => "scheduled",
        }
    }
}

impl core::fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned by [`OperatingMode::from_str`] for an unknown name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMode;

impl core::fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "unknown operating mode (expected manual, automatic or scheduled)")
    }
}

impl std::error::Error for UnknownMode {}

impl FromStr for OperatingMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "automatic" | "auto" => Ok(Self::Automatic),
            "scheduled" | "schedule" => Ok(Self::Scheduled),
            _ => Err(UnknownMode),
        }
    }
}
