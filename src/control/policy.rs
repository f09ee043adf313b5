//! Automatic climate-control policy.
//!
//! Maps the temperature error (`temperature - target`) to valve and fan
//! commands:
//!
//! ```text
//!  error:  ──── -3 ──── -2 ──── -1 ──── 0 ──── 1 ──── 2 ──── 3 ────
//!  valves: closed  │ closed │     hold (hysteresis)    │ open │ open
//!  fan:      20%   │     30%       │      45%      │     60%     │ 80%
//! ```
//!
//! A wind speed above 15 km/h caps the fan at 20% regardless of thermal
//! demand.  Tier boundaries use strict comparisons, so an error of
//! exactly 1 or 3 falls into the next looser tier.

use serde::{Deserialize, Serialize};

/// Half-width of the valve dead band around the setpoint (°C).
pub const VALVE_HYSTERESIS_C: f32 = 2.0;

/// Error above which the fan runs at [`FAN_HIGH_PERCENT`] (°C).
pub const FAN_HIGH_ERROR_C: f32 = 3.0;
/// Error above which the fan runs at [`FAN_WARM_PERCENT`] (°C).
pub const FAN_WARM_ERROR_C: f32 = 1.0;

pub const FAN_HIGH_PERCENT: u8 = 80;
pub const FAN_WARM_PERCENT: u8 = 60;
pub const FAN_DEFAULT_PERCENT: u8 = 45;
pub const FAN_COOL_PERCENT: u8 = 30;
pub const FAN_COLD_PERCENT: u8 = 20;

/// Wind speed above which the fan is capped (km/h).
pub const WIND_LIMIT_KMH: f32 = 15.0;
/// Fan ceiling while the wind interlock is engaged.
pub const WIND_FAN_CAP_PERCENT: u8 = 20;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The two irrigation valves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Valve {
    /// Valve 1, main irrigation line.
    Main,
    /// Valve 2, secondary line.
    Secondary,
}

impl Valve {
    pub const ALL: [Valve; 2] = [Valve::Main, Valve::Secondary];
}

impl core::fmt::Display for Valve {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Main => write!(f, "valve1"),
            Self::Secondary => write!(f, "valve2"),
        }
    }
}

/// Open/closed state of both valves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValveState {
    pub valve1_open: bool,
    pub valve2_open: bool,
}

impl ValveState {
    pub const CLOSED: Self = Self::new(false, false);
    pub const OPEN: Self = Self::new(true, true);

    pub const fn new(valve1_open: bool, valve2_open: bool) -> Self {
        Self {
            valve1_open,
            valve2_open,
        }
    }

    pub fn is_open(self, valve: Valve) -> bool {
        match valve {
            Valve::Main => self.valve1_open,
            Valve::Secondary => self.valve2_open,
        }
    }

    /// Copy of `self` with one valve changed.
    #[must_use]
    pub fn with(mut self, valve: Valve, open: bool) -> Self {
        match valve {
            Valve::Main => self.valve1_open = open,
            Valve::Secondary => self.valve2_open = open,
        }
        self
    }

    pub fn any_open(self) -> bool {
        self.valve1_open || self.valve2_open
    }

    /// Valves open in either state.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self::new(
            self.valve1_open || other.valve1_open,
            self.valve2_open || other.valve2_open,
        )
    }
}

/// Inputs for one policy evaluation.
///
/// Values must be finite; the [`SafetySupervisor`](crate::safety::SafetySupervisor)
/// screens snapshots before they reach [`evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Greenhouse air temperature (°C).
    pub temperature_c: f32,
    /// Setpoint (°C).
    pub target_temperature_c: f32,
    /// Wind speed (km/h), non-negative.
    pub wind_speed_kmh: f32,
}

impl SensorSnapshot {
    pub const fn new(temperature_c: f32, target_temperature_c: f32, wind_speed_kmh: f32) -> Self {
        Self {
            temperature_c,
            target_temperature_c,
            wind_speed_kmh,
        }
    }

    /// Temperature error: positive when the greenhouse is too warm.
    pub fn error_c(&self) -> f32 {
        self.temperature_c - self.target_temperature_c
    }
}

/// Output of one policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActuationDecision {
    pub valve1_open: bool,
    pub valve2_open: bool,
    /// Fan speed, always within 0–100.
    pub fan_speed_percent: u8,
}

impl ActuationDecision {
    pub fn valves(&self) -> ValveState {
        ValveState::new(self.valve1_open, self.valve2_open)
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// Evaluate the climate policy for one snapshot.
///
/// `previous` is the last valve state actually applied to the actuators;
/// it is returned unchanged while the error stays inside the hysteresis
/// band.
pub fn evaluate(previous: ValveState, snapshot: &SensorSnapshot) -> ActuationDecision {
    let error = snapshot.error_c();
    let valves = valve_rule(error, previous);
    let fan = wind_override(fan_rule(error), snapshot.wind_speed_kmh);

    ActuationDecision {
        valve1_open: valves.valve1_open,
        valve2_open: valves.valve2_open,
        fan_speed_percent: fan.min(100),
    }
}

/// Valve hysteresis: open both above the band, close both below it.
pub fn valve_rule(error_c: f32, previous: ValveState) -> ValveState {
    if error_c > VALVE_HYSTERESIS_C {
        ValveState::OPEN
    } else if error_c < -VALVE_HYSTERESIS_C {
        ValveState::CLOSED
    } else {
        previous
    }
}

/// Tiered fan speed, first match wins.
pub fn fan_rule(error_c: f32) -> u8 {
    if error_c > FAN_HIGH_ERROR_C {
        FAN_HIGH_PERCENT
    } else if error_c > FAN_WARM_ERROR_C {
        FAN_WARM_PERCENT
    } else if error_c < -FAN_HIGH_ERROR_C {
        FAN_COLD_PERCENT
    } else if error_c < -FAN_WARM_ERROR_C {
        FAN_COOL_PERCENT
    } else {
        FAN_DEFAULT_PERCENT
    }
}

/// High wind destabilises airflow control, so it caps the fan.
pub fn wind_override(fan_percent: u8, wind_speed_kmh: f32) -> u8 {
    if wind_speed_kmh > WIND_LIMIT_KMH {
        fan_percent.min(WIND_FAN_CAP_PERCENT)
    } else {
        fan_percent
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
