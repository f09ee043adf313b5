//! Synthetic greenhouse sensors.
//!
//! Produces a plausible [`GreenhouseReadings`] frame on every read.  Air
//! temperature, pressure and outside temperature jitter around fixed
//! base values; soil moisture, wind, light and CO₂ random-walk inside
//! their physical bounds.
//!
//! Seed with [`SensorSimulator::with_seed`] for reproducible runs.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::readings::GreenhouseReadings;

const BASE_TEMPERATURE_C: f32 = 22.5;
const BASE_PRESSURE_BAR: f32 = 1.2;
const BASE_EXTERNAL_C: f32 = 18.7;

pub struct SensorSimulator {
    rng: SmallRng,
    last: GreenhouseReadings,
    /// Frame returned verbatim on the next read instead of a synthetic one.
    injected: Option<GreenhouseReadings>,
}

impl SensorSimulator {
    pub fn new() -> Self {
        Self::from_rng(SmallRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed))
    }

    fn from_rng(rng: SmallRng) -> Self {
        Self {
            rng,
            last: GreenhouseReadings::default(),
            injected: None,
        }
    }

    /// Override the next frame (fault drills, demos).
    pub fn inject(&mut self, frame: GreenhouseReadings) {
        self.injected = Some(frame);
    }

    pub fn read(&mut self) -> GreenhouseReadings {
        if let Some(frame) = self.injected.take() {
            self.last = frame;
            return frame;
        }

        let prev = self.last;
        let next = GreenhouseReadings {
            temperature: BASE_TEMPERATURE_C + self.jitter(10.0),
            pressure: BASE_PRESSURE_BAR + self.jitter(0.8),
            soil_moisture: (prev.soil_moisture + self.jitter(10.0)).clamp(20.0, 90.0),
            wind_speed: (prev.wind_speed + self.jitter(5.0)).clamp(0.0, 25.0),
            light_intensity: (prev.light_intensity + self.jitter(20.0)).clamp(0.0, 100.0),
            co2_saturation: (prev.co2_saturation + self.jitter(50.0)).clamp(300.0, 600.0),
            external_temperature: BASE_EXTERNAL_C + self.jitter(8.0),
        };
        self.last = next;
        next
    }

    /// Uniform offset in `[-span/2, span/2)`.
    fn jitter(&mut self, span: f32) -> f32 {
        (self.rng.r#gen::<f32>() - 0.5) * span
    }
}

impl Default for SensorSimulator {
    fn default() -> Self {
        Self::new()
    }
}
