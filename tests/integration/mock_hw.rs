//! Mock adapters for integration tests.
//!
//! Records every actuator call so tests can assert on the full command
//! history, and serves scripted sensor frames.

use std::cell::RefCell;
use std::collections::VecDeque;

use greenhouse::app::events::AppEvent;
use greenhouse::app::ports::{ActuatorPort, ConfigError, ConfigPort, EventSink, SensorPort};
use greenhouse::config::SystemConfig;
use greenhouse::control::policy::{Valve, ValveState};
use greenhouse::readings::GreenhouseReadings;

// ── Actuator call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ActuatorCall {
    SetValve { valve: Valve, open: bool },
    SetFan { percent: u8 },
    AllOff,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<ActuatorCall>,
    /// Frames served in order; the last one repeats.
    frames: VecDeque<GreenhouseReadings>,
    current: GreenhouseReadings,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            frames: VecDeque::new(),
            current: GreenhouseReadings::default(),
        }
    }

    /// Hardware whose sensors read `temperature` and `wind_speed`.
    pub fn reading(temperature: f32, wind_speed: f32) -> Self {
        let mut hw = Self::new();
        hw.set_reading(temperature, wind_speed);
        hw
    }

    pub fn set_reading(&mut self, temperature: f32, wind_speed: f32) {
        self.current = GreenhouseReadings {
            temperature,
            wind_speed,
            ..GreenhouseReadings::default()
        };
    }

    pub fn queue_frame(&mut self, frame: GreenhouseReadings) {
        self.frames.push_back(frame);
    }

    pub fn valves(&self) -> ValveState {
        let mut state = ValveState::CLOSED;
        for c in &self.calls {
            match c {
                ActuatorCall::SetValve { valve, open } => state = state.with(*valve, *open),
                ActuatorCall::AllOff => state = ValveState::CLOSED,
                ActuatorCall::SetFan { .. } => {}
            }
        }
        state
    }

    pub fn fan_percent(&self) -> Option<u8> {
        self.calls.iter().rev().find_map(|c| match c {
            ActuatorCall::SetFan { percent } => Some(*percent),
            ActuatorCall::AllOff => Some(0),
            ActuatorCall::SetValve { .. } => None,
        })
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_all(&mut self) -> GreenhouseReadings {
        if let Some(frame) = self.frames.pop_front() {
            self.current = frame;
        }
        self.current
    }
}

impl ActuatorPort for MockHardware {
    fn set_valve(&mut self, valve: Valve, open: bool) {
        self.calls.push(ActuatorCall::SetValve { valve, open });
    }

    fn set_fan_speed(&mut self, percent: u8) {
        self.calls.push(ActuatorCall::SetFan { percent });
    }

    fn all_off(&mut self) {
        self.calls.push(ActuatorCall::AllOff);
    }
}

// ── Event recorder ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Config store ──────────────────────────────────────────────

#[derive(Default)]
pub struct MockConfigStore {
    pub saved: RefCell<Vec<SystemConfig>>,
    pub fail: bool,
}

#[allow(dead_code)]
impl MockConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save_count(&self) -> usize {
        self.saved.borrow().len()
    }
}

impl ConfigPort for MockConfigStore {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        Ok(self.saved.borrow().last().cloned().unwrap_or_default())
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        if self.fail {
            return Err(ConfigError::IoError);
        }
        self.saved.borrow_mut().push(config.clone());
        Ok(())
    }
}
