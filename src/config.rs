//! System configuration parameters
//!
//! Operator settings and loop timing for the greenhouse controller.
//! Values are persisted through a [`ConfigPort`](crate::app::ports::ConfigPort)
//! and can be changed at runtime via [`AppCommand`](crate::app::commands::AppCommand).

use core::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::app::mode::OperatingMode;

/// Lowest accepted setpoint (°C).
pub const SETPOINT_MIN_C: f32 = 10.0;
/// Highest accepted setpoint (°C).
pub const SETPOINT_MAX_C: f32 = 40.0;

/// Accepted control loop intervals (milliseconds).
pub const LOOP_INTERVAL_MS: RangeInclusive<u32> = 500..=60_000;
/// Accepted telemetry intervals (seconds).
pub const TELEMETRY_INTERVAL_SECS: RangeInclusive<u32> = 5..=3600;
/// Accepted schedule trigger windows (seconds).
pub const SCHEDULE_WINDOW_SECS: RangeInclusive<u32> = 1..=3600;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Climate ---
    /// Target greenhouse temperature (°C), within [`SETPOINT_MIN_C`]..=[`SETPOINT_MAX_C`]
    pub target_temperature_c: f32,
    /// Fan speed applied in Manual / Scheduled mode (0-100%)
    pub fan_speed_percent: u8,
    /// Mode the controller boots into
    pub operating_mode: OperatingMode,

    // --- Scheduling ---
    /// How far ahead of its start time a scheduled event may fire (seconds)
    pub schedule_window_secs: u32,

    // --- Timing ---
    /// Sensor read + control loop interval (milliseconds)
    pub control_loop_interval_ms: u32,
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Climate
            target_temperature_c: 24.0,
            fan_speed_percent: 45,
            operating_mode: OperatingMode::Manual,

            // Scheduling
            schedule_window_secs: 60,

            // Timing
            control_loop_interval_ms: 2000, // 0.5 Hz
            telemetry_interval_secs: 60,    // 1/min
        }
    }
}

/// Clamp a finite setpoint into the supported operating range.
pub fn clamp_setpoint(target_c: f32) -> f32 {
    target_c.clamp(SETPOINT_MIN_C, SETPOINT_MAX_C)
}

/// True if `target_c` is finite and inside the operating range.
pub fn setpoint_in_range(target_c: f32) -> bool {
    target_c.is_finite() && (SETPOINT_MIN_C..=SETPOINT_MAX_C).contains(&target_c)
}

/// Range-check every field, naming the first one out of range.
///
/// Used before saving and when a new config arrives at runtime.
pub fn validate_config(cfg: &SystemConfig) -> Result<(), &'static str> {
    if !setpoint_in_range(cfg.target_temperature_c) {
        return Err("target_temperature_c must be 10.0-40.0");
    }
    if cfg.fan_speed_percent > 100 {
        return Err("fan_speed_percent must be 0-100");
    }
    if !LOOP_INTERVAL_MS.contains(&cfg.control_loop_interval_ms) {
        return Err("control_loop_interval_ms must be 500-60000");
    }
    if !TELEMETRY_INTERVAL_SECS.contains(&cfg.telemetry_interval_secs) {
        return Err("telemetry_interval_secs must be 5-3600");
    }
    if !SCHEDULE_WINDOW_SECS.contains(&cfg.schedule_window_secs) {
        return Err("schedule_window_secs must be 1-3600");
    }
    Ok(())
}
