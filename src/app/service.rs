//! Application service, the hexagonal core.
//!
//! [`AppService`] owns the operating mode, safety supervisor, actuation
//! queue and live configuration.  All I/O flows through port traits
//! injected at call sites, making the entire service testable with mock
//! adapters.
//!
//! ```text
//!  SensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │        AppService         │
//! ActuatorPort ◀──│ Mode · Safety · Policy    │
//!                 └──────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::{SystemConfig, clamp_setpoint, validate_config};
use crate::control::policy::{self, ValveState};
use crate::error::{CommandError, Result};
use crate::readings::GreenhouseReadings;
use crate::safety::SafetySupervisor;
use crate::scheduler::{EventKind, MAX_EVENTS, ScheduleFiring};
use crate::status::StatusSummary;

use super::actuation::{ActuationCommand, ActuationQueue, AppliedState};
use super::commands::AppCommand;
use super::events::{AppEvent, TelemetryData};
use super::mode::OperatingMode;
use super::ports::{ActuatorPort, ConfigPort, EventSink, ScheduleFiredKind, SensorPort};

/// Seconds a config change may stay unsaved before auto-save.
const AUTO_SAVE_DELAY_SECS: f32 = 5.0;

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    config: SystemConfig,
    safety: SafetySupervisor,
    actuation: ActuationQueue,
    /// Last sensor frame read.
    readings: GreenhouseReadings,
    fault_flags: u8,
    /// Seconds per control tick (derived from config).
    tick_secs: f32,
    tick_count: u64,
    config_dirty: bool,
    dirty_since_tick: u64,
    /// Set by [`AppCommand::SaveConfig`]: skip the auto-save delay once.
    save_requested: bool,
    /// Valves held by each running irrigation event, by event id.
    irrigation_holds: heapless::Vec<(u32, ValveState), MAX_EVENTS>,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch the hardware; call [`start`](Self::start) next.
    pub fn new(config: SystemConfig) -> Self {
        let tick_secs = config.control_loop_interval_ms as f32 / 1000.0;
        let actuation = ActuationQueue::new(AppliedState {
            valves: ValveState::CLOSED,
            fan_speed_percent: config.fan_speed_percent.min(100),
        });

        Self {
            config,
            safety: SafetySupervisor::new(),
            actuation,
            readings: GreenhouseReadings::default(),
            fault_flags: 0,
            tick_secs,
            tick_count: 0,
            config_dirty: false,
            dirty_since_tick: 0,
            save_requested: false,
            irrigation_holds: heapless::Vec::new(),
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive the actuators to the boot state (valves closed, configured
    /// fan speed) and announce the mode.
    pub fn start(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        let boot = self.actuation.applied();
        for valve in policy::Valve::ALL {
            hw.set_valve(valve, boot.valves.is_open(valve));
        }
        hw.set_fan_speed(boot.fan_speed_percent);
        sink.emit(&AppEvent::Started(self.config.operating_mode));
        info!("AppService started in {} mode", self.config.operating_mode);
    }

    /// Close everything before exit.  Flushes pending writes first.
    pub fn shutdown(&mut self, hw: &mut impl ActuatorPort) {
        self.actuation.flush(hw);
        hw.all_off();
        info!("AppService stopped, actuators off");
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full control cycle: read sensors → safety → policy → actuators.
    ///
    /// The `hw` parameter satisfies **both** [`SensorPort`] and
    /// [`ActuatorPort`]; this avoids a double mutable borrow while
    /// keeping the port boundary explicit.
    pub fn tick(&mut self, hw: &mut (impl SensorPort + ActuatorPort), sink: &mut impl EventSink) {
        self.tick_count += 1;

        // 1. Read sensors via SensorPort
        self.readings = hw.read_all();
        let snapshot = self
            .readings
            .policy_snapshot(self.config.target_temperature_c);

        // 2. Safety evaluation
        let prev_faults = self.fault_flags;
        let faults = self.safety.evaluate(&snapshot);
        self.fault_flags = faults;

        if faults != 0 && faults != prev_faults {
            warn!("Safety fault! flags=0b{:08b}", faults);
            sink.emit(&AppEvent::FaultDetected(faults));
        } else if faults == 0 && prev_faults != 0 {
            info!("All safety faults cleared, resuming control");
            sink.emit(&AppEvent::FaultCleared);
        }

        // 3. Climate policy (automatic mode only, inputs must be sane)
        if self.config.operating_mode.is_automatic() && faults == 0 {
            let decision = policy::evaluate(self.actuation.applied().valves, &snapshot);
            self.actuation.enqueue_decision(&decision, hw);
        }

        // 4. Apply queued writes via ActuatorPort
        self.flush_actuation(hw, sink);
    }

    /// Emit a telemetry snapshot.
    pub fn report_telemetry(&self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::Telemetry(self.build_telemetry()));
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an operator command.
    ///
    /// Refused commands emit [`AppEvent::CommandRejected`] and return the
    /// error; nothing is written to the actuators.
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) -> Result<()> {
        match cmd {
            AppCommand::SetMode(mode) => self.set_mode(mode, sink),
            AppCommand::ToggleValve(valve) => {
                self.ensure_manual(sink)?;
                let open = !self.actuation.applied().valves.is_open(valve);
                self.queue(ActuationCommand::SetValve { valve, open }, hw);
                info!("{} toggled {}", valve, if open { "open" } else { "closed" });
                self.flush_actuation(hw, sink);
            }
            AppCommand::SetValve { valve, open } => {
                self.ensure_manual(sink)?;
                self.queue(ActuationCommand::SetValve { valve, open }, hw);
                self.flush_actuation(hw, sink);
            }
            AppCommand::SetFanSpeed(percent) => {
                self.ensure_manual(sink)?;
                let percent = percent.min(100);
                self.queue(ActuationCommand::SetFan { percent }, hw);
                self.flush_actuation(hw, sink);
                self.config.fan_speed_percent = percent;
                self.mark_config_dirty();
            }
            AppCommand::SetTargetTemperature(target_c) => {
                if !target_c.is_finite() {
                    return Err(self.reject(CommandError::NonFiniteSetpoint, sink));
                }
                let clamped = clamp_setpoint(target_c);
                if clamped != target_c {
                    warn!("Setpoint {:.1} °C clamped to {:.1} °C", target_c, clamped);
                }
                self.config.target_temperature_c = clamped;
                self.mark_config_dirty();
                info!("Target temperature set to {:.1} °C", clamped);
            }
            AppCommand::UpdateConfig(mut new_config) => {
                if !new_config.target_temperature_c.is_finite() {
                    return Err(self.reject(CommandError::NonFiniteSetpoint, sink));
                }
                new_config.target_temperature_c = clamp_setpoint(new_config.target_temperature_c);
                if let Err(reason) = validate_config(&new_config) {
                    return Err(self.reject(CommandError::InvalidConfig(reason), sink));
                }
                let from = self.config.operating_mode;
                self.tick_secs = new_config.control_loop_interval_ms as f32 / 1000.0;
                self.config = new_config;
                self.mark_config_dirty();
                if from != self.config.operating_mode {
                    sink.emit(&AppEvent::ModeChanged {
                        from,
                        to: self.config.operating_mode,
                    });
                }
                info!("Configuration updated at runtime");
            }
            AppCommand::SaveConfig => {
                self.mark_config_dirty();
                self.save_requested = true;
                info!("Explicit config save requested (will flush on next auto-save check)");
            }
        }
        Ok(())
    }

    // ── Schedule integration ──────────────────────────────────

    /// React to a schedule start or finish.
    ///
    /// Only irrigation events in Scheduled mode touch the valves.
    /// A valve stays open while any running irrigation event includes it.
    pub fn on_schedule(
        &mut self,
        firing: ScheduleFiring,
        hw: &mut impl ActuatorPort,
        sink: &mut impl EventSink,
    ) {
        match firing.phase {
            ScheduleFiredKind::Started => sink.emit(&AppEvent::ScheduleStarted {
                id: firing.id,
                kind: firing.kind,
            }),
            ScheduleFiredKind::Finished => {
                sink.emit(&AppEvent::ScheduleFinished { id: firing.id })
            }
        }

        if firing.kind == EventKind::Irrigation {
            self.track_irrigation(&firing);
        }

        if self.config.operating_mode != OperatingMode::Scheduled {
            info!(
                "Schedule {} {:?} ignored in {} mode",
                firing.id, firing.phase, self.config.operating_mode
            );
            return;
        }
        if firing.kind != EventKind::Irrigation {
            info!("Schedule {} ({:?}) {:?}", firing.id, firing.kind, firing.phase);
            return;
        }

        // Valves any running irrigation event still needs stay open.
        let held = self.held_valves();
        match firing.phase {
            ScheduleFiredKind::Started => {
                for valve in policy::Valve::ALL {
                    let open = held.is_open(valve);
                    self.queue(ActuationCommand::SetValve { valve, open }, hw);
                }
            }
            ScheduleFiredKind::Finished => {
                for valve in policy::Valve::ALL {
                    if firing.valves.is_open(valve) && !held.is_open(valve) {
                        self.queue(ActuationCommand::SetValve { valve, open: false }, hw);
                    }
                }
            }
        }
        self.flush_actuation(hw, sink);
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a telemetry snapshot from the current state.
    pub fn build_telemetry(&self) -> TelemetryData {
        let applied = self.actuation.applied();
        TelemetryData {
            tick: self.tick_count,
            mode: self.config.operating_mode,
            readings: self.readings,
            target_temperature: self.config.target_temperature_c,
            valves: applied.valves,
            fan_speed: applied.fan_speed_percent,
            fault_flags: self.fault_flags,
            status: StatusSummary::classify(
                &self.readings,
                self.config.target_temperature_c,
                applied.fan_speed_percent,
            ),
        }
    }

    pub fn mode(&self) -> OperatingMode {
        self.config.operating_mode
    }

    /// Actuator state last written to the hardware.
    pub fn applied(&self) -> AppliedState {
        self.actuation.applied()
    }

    pub fn readings(&self) -> &GreenhouseReadings {
        &self.readings
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Current active fault bitmask (0 = no faults).
    pub fn fault_flags(&self) -> u8 {
        self.fault_flags
    }

    /// Clone of the live configuration.
    pub fn current_config(&self) -> SystemConfig {
        self.config.clone()
    }

    // ── Internal ──────────────────────────────────────────────

    fn set_mode(&mut self, mode: OperatingMode, sink: &mut impl EventSink) {
        let from = self.config.operating_mode;
        if from == mode {
            return;
        }
        self.config.operating_mode = mode;
        self.mark_config_dirty();
        info!("Mode changed: {} -> {}", from, mode);
        sink.emit(&AppEvent::ModeChanged { from, to: mode });
    }

    fn ensure_manual(&self, sink: &mut impl EventSink) -> Result<()> {
        if self.config.operating_mode.is_automatic() {
            return Err(self.reject(CommandError::AutomaticModeActive, sink));
        }
        Ok(())
    }

    fn reject(&self, err: CommandError, sink: &mut impl EventSink) -> crate::error::Error {
        warn!("Command rejected: {}", err);
        sink.emit(&AppEvent::CommandRejected(err));
        err.into()
    }

    fn track_irrigation(&mut self, firing: &ScheduleFiring) {
        self.irrigation_holds.retain(|(id, _)| *id != firing.id);
        if firing.phase == ScheduleFiredKind::Started
            && self.irrigation_holds.push((firing.id, firing.valves)).is_err()
        {
            warn!("Schedule {}: too many running irrigation events", firing.id);
        }
    }

    fn held_valves(&self) -> ValveState {
        self.irrigation_holds
            .iter()
            .fold(ValveState::CLOSED, |acc, (_, valves)| acc.union(*valves))
    }

    fn queue(&mut self, cmd: ActuationCommand, hw: &mut impl ActuatorPort) {
        self.actuation.push_or_flush(cmd, hw);
    }

    fn flush_actuation(&mut self, hw: &mut impl ActuatorPort, sink: &mut impl EventSink) {
        if self.actuation.flush(hw) {
            sink.emit(&AppEvent::ActuationApplied(self.actuation.applied()));
        }
    }

    // ── Config dirty-flag management ──────────────────────────

    /// Mark the config as modified.
    ///
    /// Every call restarts the auto-save delay.
    pub fn mark_config_dirty(&mut self) {
        self.config_dirty = true;
        self.dirty_since_tick = self.tick_count;
    }

    /// Check if auto-save should trigger (5 seconds after last change).
    /// Returns `true` if the config was saved.
    pub fn auto_save_if_needed(&mut self, storage: &impl ConfigPort) -> bool {
        if !self.config_dirty {
            return false;
        }
        let ticks_since_dirty = self.tick_count.saturating_sub(self.dirty_since_tick);
        let secs_since_dirty = ticks_since_dirty as f32 * self.tick_secs;
        if !self.save_requested && secs_since_dirty < AUTO_SAVE_DELAY_SECS {
            return false;
        }
        match storage.save(&self.config) {
            Ok(()) => {
                self.config_dirty = false;
                self.save_requested = false;
                log::info!("Config auto-saved");
                true
            }
            Err(e) => {
                log::warn!("Config auto-save failed: {}", e);
                false
            }
        }
    }

    /// Force-save if dirty (call before shutdown).
    pub fn force_save_if_dirty(&mut self, storage: &impl ConfigPort) {
        if !self.config_dirty {
            return;
        }
        match storage.save(&self.config) {
            Ok(()) => {
                self.config_dirty = false;
                self.save_requested = false;
                log::info!("Config force-saved before shutdown");
            }
            Err(e) => {
                log::warn!("Config force-save failed: {}", e);
            }
        }
    }

    /// Whether the config has unsaved changes.
    pub fn is_config_dirty(&self) -> bool {
        self.config_dirty
    }
}
