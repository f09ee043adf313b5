//! Full greenhouse sensor frame.
//!
//! [`GreenhouseReadings`] is what a [`SensorPort`](crate::app::ports::SensorPort)
//! produces each tick.  The climate policy only needs a projection of it
//! (see [`GreenhouseReadings::policy_snapshot`]); the rest feeds
//! telemetry and status classification.

use serde::{Deserialize, Serialize};

use crate::control::policy::SensorSnapshot;

/// A point-in-time snapshot of every greenhouse sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreenhouseReadings {
    /// Greenhouse air temperature (°C).
    pub temperature: f32,
    /// Line pressure (bar).
    pub pressure: f32,
    /// Soil moisture (%).
    pub soil_moisture: f32,
    /// Wind speed (km/h).
    pub wind_speed: f32,
    /// Light intensity (%).
    pub light_intensity: f32,
    /// CO₂ concentration (ppm).
    pub co2_saturation: f32,
    /// Outside air temperature (°C).
    pub external_temperature: f32,
}

impl Default for GreenhouseReadings {
    /// Frame the controller assumes before the first read.
    fn default() -> Self {
        Self {
            temperature: 22.5,
            pressure: 1.2,
            soil_moisture: 45.0,
            wind_speed: 8.3,
            light_intensity: 75.0,
            co2_saturation: 420.0,
            external_temperature: 18.7,
        }
    }
}

impl GreenhouseReadings {
    /// Project the policy inputs, pairing the readings with `target_c`.
    pub fn policy_snapshot(&self, target_c: f32) -> SensorSnapshot {
        SensorSnapshot::new(self.temperature, target_c, self.wind_speed)
    }
}
