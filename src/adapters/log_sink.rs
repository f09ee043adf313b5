//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade.  Telemetry can optionally be rendered as one JSON
//! line for downstream collectors.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the console.
#[derive(Default)]
pub struct LogEventSink {
    json_telemetry: bool,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit telemetry as a JSON object instead of the compact text line.
    pub fn with_json_telemetry(mut self, enabled: bool) -> Self {
        self.json_telemetry = enabled;
        self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Telemetry(t) if self.json_telemetry => match serde_json::to_string(t) {
                Ok(json) => info!("TELEM | {}", json),
                Err(e) => warn!("TELEM | serialisation failed: {}", e),
            },
            AppEvent::Telemetry(t) => {
                info!(
                    "TELEM | mode={} | T={:.1}/{:.1}\u{00b0}C ({:?}) | wind={:.1}km/h | \
                     soil={:.0}% | valves={}/{} | fan={}% | faults=0b{:08b}",
                    t.mode,
                    t.readings.temperature,
                    t.target_temperature,
                    t.status.temperature,
                    t.readings.wind_speed,
                    t.readings.soil_moisture,
                    if t.valves.valve1_open { "OPEN" } else { "CLOSED" },
                    if t.valves.valve2_open { "OPEN" } else { "CLOSED" },
                    t.fan_speed,
                    t.fault_flags,
                );
            }
            AppEvent::ModeChanged { from, to } => {
                info!("MODE | {} -> {}", from, to);
            }
            AppEvent::ActuationApplied(s) => {
                info!(
                    "ACT | valve1={} valve2={} fan={}%",
                    s.valves.valve1_open, s.valves.valve2_open, s.fan_speed_percent
                );
            }
            AppEvent::CommandRejected(e) => {
                warn!("CMD | rejected: {}", e);
            }
            AppEvent::FaultDetected(flags) => {
                info!("FAULT | detected, flags=0b{:08b}", flags);
            }
            AppEvent::FaultCleared => {
                info!("FAULT | all cleared");
            }
            AppEvent::ScheduleStarted { id, kind } => {
                info!("SCHED | event {} ({:?}) started", id, kind);
            }
            AppEvent::ScheduleFinished { id } => {
                info!("SCHED | event {} finished", id);
            }
            AppEvent::Started(mode) => {
                info!("START | mode={}", mode);
            }
        }
    }
}
