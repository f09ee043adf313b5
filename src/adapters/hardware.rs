//! Hardware adapter, bridges the greenhouse peripherals to domain port traits.
//!
//! Owns the sensor source and all actuator drivers, exposing them through
//! [`SensorPort`] and [`ActuatorPort`].  On the host the sensor source is
//! the [`SensorSimulator`].

use crate::adapters::simulator::SensorSimulator;
use crate::app::ports::{ActuatorPort, SensorPort};
use crate::control::policy::{Valve, ValveState};
use crate::drivers::fan::FanDriver;
use crate::drivers::valve::ValveDriver;
use crate::readings::GreenhouseReadings;

/// Concrete adapter that combines all hardware behind port traits.
pub struct GreenhouseHardware {
    sensors: SensorSimulator,
    valve1: ValveDriver,
    valve2: ValveDriver,
    fan: FanDriver,
}

impl GreenhouseHardware {
    pub fn new(sensors: SensorSimulator) -> Self {
        Self {
            sensors,
            valve1: ValveDriver::new(Valve::Main),
            valve2: ValveDriver::new(Valve::Secondary),
            fan: FanDriver::new(),
        }
    }

    pub fn sensors_mut(&mut self) -> &mut SensorSimulator {
        &mut self.sensors
    }

    pub fn valves(&self) -> ValveState {
        ValveState::new(self.valve1.is_open(), self.valve2.is_open())
    }

    pub fn fan(&self) -> &FanDriver {
        &self.fan
    }

    fn valve_mut(&mut self, valve: Valve) -> &mut ValveDriver {
        match valve {
            Valve::Main => &mut self.valve1,
            Valve::Secondary => &mut self.valve2,
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for GreenhouseHardware {
    fn read_all(&mut self) -> GreenhouseReadings {
        self.sensors.read()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl ActuatorPort for GreenhouseHardware {
    fn set_valve(&mut self, valve: Valve, open: bool) {
        self.valve_mut(valve).set(open);
    }

    fn set_fan_speed(&mut self, percent: u8) {
        self.fan.set(percent);
    }

    fn all_off(&mut self) {
        self.valve1.close();
        self.valve2.close();
        self.fan.stop();
    }
}
