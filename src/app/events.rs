//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use serde::Serialize;

use crate::app::actuation::AppliedState;
use crate::app::mode::OperatingMode;
use crate::control::policy::ValveState;
use crate::error::CommandError;
use crate::readings::GreenhouseReadings;
use crate::scheduler::EventKind;
use crate::status::StatusSummary;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Periodic telemetry snapshot.
    Telemetry(TelemetryData),

    /// The operating mode changed.
    ModeChanged { from: OperatingMode, to: OperatingMode },

    /// New actuator state written to the hardware.
    ActuationApplied(AppliedState),

    /// An operator command was refused.
    CommandRejected(CommandError),

    /// One or more safety faults were raised.
    FaultDetected(u8),

    /// All safety faults have been cleared.
    FaultCleared,

    /// A scheduled event began.
    ScheduleStarted { id: u32, kind: EventKind },

    /// A scheduled event ran to completion.
    ScheduleFinished { id: u32 },

    /// The application service has started (carries initial mode).
    Started(OperatingMode),
}

/// A point-in-time telemetry snapshot suitable for logging or transmission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryData {
    pub tick: u64,
    pub mode: OperatingMode,
    pub readings: GreenhouseReadings,
    pub target_temperature: f32,
    pub valves: ValveState,
    pub fan_speed: u8,
    pub fault_flags: u8,
    pub status: StatusSummary,
}
