//! Sensor status classification.
//!
//! Derived labels for operator displays and telemetry.  None of these feed
//! back into control decisions.

use serde::Serialize;

use crate::readings::GreenhouseReadings;

/// Health of a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    Good,
    Warning,
    Critical,
}

/// Distance of the air temperature from the setpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureStatus {
    /// Within ±1 °C.
    Optimal,
    /// Within ±3 °C.
    NearTarget,
    FarFromTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FanStatus {
    Off,
    Quiet,
    Moderate,
    Fast,
}

pub fn wind_status(kmh: f32) -> SensorStatus {
    if kmh > 15.0 {
        SensorStatus::Critical
    } else if kmh > 10.0 {
        SensorStatus::Warning
    } else {
        SensorStatus::Good
    }
}

pub fn light_status(percent: f32) -> SensorStatus {
    if !(30.0..=90.0).contains(&percent) {
        SensorStatus::Warning
    } else {
        SensorStatus::Good
    }
}

pub fn co2_status(ppm: f32) -> SensorStatus {
    if !(350.0..=500.0).contains(&ppm) {
        SensorStatus::Warning
    } else {
        SensorStatus::Good
    }
}

pub fn soil_status(percent: f32) -> SensorStatus {
    if percent < 30.0 {
        SensorStatus::Critical
    } else if percent < 50.0 {
        SensorStatus::Warning
    } else {
        SensorStatus::Good
    }
}

pub fn pressure_status(bar: f32) -> SensorStatus {
    if bar < 0.5 {
        SensorStatus::Critical
    } else {
        SensorStatus::Good
    }
}

pub fn temperature_status(current_c: f32, target_c: f32) -> TemperatureStatus {
    let diff = (current_c - target_c).abs();
    if diff <= 1.0 {
        TemperatureStatus::Optimal
    } else if diff <= 3.0 {
        TemperatureStatus::NearTarget
    } else {
        TemperatureStatus::FarFromTarget
    }
}

pub fn fan_status(percent: u8) -> FanStatus {
    match percent {
        0 => FanStatus::Off,
        1..=30 => FanStatus::Quiet,
        31..=70 => FanStatus::Moderate,
        _ => FanStatus::Fast,
    }
}

/// Per-sensor classification of one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub pressure: SensorStatus,
    pub soil: SensorStatus,
    pub wind: SensorStatus,
    pub light: SensorStatus,
    pub co2: SensorStatus,
    pub temperature: TemperatureStatus,
    pub fan: FanStatus,
}

impl StatusSummary {
    pub fn classify(r: &GreenhouseReadings, target_c: f32, fan_percent: u8) -> Self {
        Self {
            pressure: pressure_status(r.pressure),
            soil: soil_status(r.soil_moisture),
            wind: wind_status(r.wind_speed),
            light: light_status(r.light_intensity),
            co2: co2_status(r.co2_saturation),
            temperature: temperature_status(r.temperature, target_c),
            fan: fan_status(fan_percent),
        }
    }

    /// Most severe sensor status in the frame.
    pub fn worst(&self) -> SensorStatus {
        [self.pressure, self.soil, self.wind, self.light, self.co2]
            .into_iter()
            .max()
            .unwrap_or(SensorStatus::Good)
    }
}
