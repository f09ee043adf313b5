//! Greenhouse controller, host simulator entry point.
//!
//! Hexagonal architecture with event-driven execution.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  GreenhouseHardware  LogEventSink   SettingsStore  SystemClock │
//! │  (Sensor+Actuator)   (EventSink)    (ConfigPort)   (time)      │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Mode · Safety · Policy · ActuationQueue               │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Scheduler (delegate-driven) · EventQueue                      │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Environment:
//!
//! | Variable              | Effect                                  |
//! |-----------------------|-----------------------------------------|
//! | `RUST_LOG`            | log filter (default `info`)             |
//! | `IRRIGATION_MODE`     | boot mode override                      |
//! | `GREENHOUSE_SETTINGS` | settings file (in-memory if unset)      |
//! | `GREENHOUSE_SEED`     | simulator seed                          |
//! | `GREENHOUSE_TICKS`    | stop after this many control ticks      |
//! | `GREENHOUSE_JSON`     | render telemetry as JSON when set       |
//!
//! Operator commands are read line by line from stdin.  Closing stdin
//! (Ctrl-D) stops the loop and saves pending settings, unless
//! `GREENHOUSE_TICKS` is set, in which case the tick limit decides.

use std::io::BufRead;
use std::sync::mpsc::{self, TryRecvError};

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime};
use log::{info, warn};

use greenhouse::adapters::hardware::GreenhouseHardware;
use greenhouse::adapters::log_sink::LogEventSink;
use greenhouse::adapters::settings::SettingsStore;
use greenhouse::adapters::simulator::SensorSimulator;
use greenhouse::adapters::time::SystemClock;
use greenhouse::app::commands::parse_command;
use greenhouse::app::mode::OperatingMode;
use greenhouse::app::ports::ConfigPort;
use greenhouse::app::service::AppService;
use greenhouse::config::SystemConfig;
use greenhouse::control::policy::ValveState;
use greenhouse::error::ScheduleError;
use greenhouse::events::{Event, EventQueue};
use greenhouse::scheduler::{EventKind, ScheduledEvent, Scheduler};

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  Greenhouse v{}                   ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load settings (or defaults) ────────────────────────
    let settings = match std::env::var("GREENHOUSE_SETTINGS") {
        Ok(path) => SettingsStore::at_path(path),
        Err(_) => SettingsStore::in_memory(),
    };
    let mut config = match settings.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("Settings load failed ({}), using defaults", e);
            SystemConfig::default()
        }
    };
    if let Ok(mode) = std::env::var("IRRIGATION_MODE") {
        config.operating_mode = mode
            .parse::<OperatingMode>()
            .with_context(|| format!("IRRIGATION_MODE={mode}"))?;
        info!("Mode override from environment: {}", config.operating_mode);
    }

    // ── 3. Construct adapters ─────────────────────────────────
    let simulator = match std::env::var("GREENHOUSE_SEED") {
        Ok(seed) => SensorSimulator::with_seed(seed.parse().context("GREENHOUSE_SEED")?),
        Err(_) => SensorSimulator::new(),
    };
    let max_ticks: Option<u64> = std::env::var("GREENHOUSE_TICKS")
        .ok()
        .map(|n| n.parse())
        .transpose()
        .context("GREENHOUSE_TICKS")?;

    let mut hw = GreenhouseHardware::new(simulator);
    let mut log_sink =
        LogEventSink::new().with_json_telemetry(std::env::var_os("GREENHOUSE_JSON").is_some());
    let clock = SystemClock::new();
    let mut queue = EventQueue::new();

    let mut sched = Scheduler::new(config.schedule_window_secs);
    for event in demo_schedule(clock.now_local())? {
        sched.add(event)?;
    }
    info!(
        "Schedule: {} events loaded ({} irrigation)",
        sched.len(),
        sched
            .events()
            .filter(|e| e.kind == EventKind::Irrigation)
            .count()
    );
    for event in sched.upcoming(clock.now_local(), 3) {
        info!("Upcoming: '{}' at {} ({:?})", event.title, event.start, event.kind);
    }

    // ── 4. Operator console ───────────────────────────────────
    let (cmd_tx, cmd_rx) = mpsc::channel::<String>();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines().map_while(std::result::Result::ok) {
            if cmd_tx.send(line).is_err() {
                break;
            }
        }
    });

    // ── 5. Construct app service ──────────────────────────────
    let mut app = AppService::new(config.clone());
    app.start(&mut hw, &mut log_sink);

    info!("System ready. Entering event loop.");

    // ── 6. Event loop ─────────────────────────────────────────
    let telemetry_every_ms = u64::from(config.telemetry_interval_secs) * 1000;
    let mut last_telemetry_ms: u64 = 0;
    let mut console_open = true;

    loop {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(
            config.control_loop_interval_ms,
        )));
        queue.push(Event::ControlTick);

        let now_ms = clock.uptime_ms();
        if now_ms.saturating_sub(last_telemetry_ms) >= telemetry_every_ms {
            queue.push(Event::TelemetryTick);
            last_telemetry_ms = now_ms;
        }

        loop {
            match cmd_rx.try_recv() {
                Ok(line) => match parse_command(&line) {
                    Ok(cmd) => {
                        queue.push(Event::Command(cmd));
                    }
                    Err(e) => warn!("Console: {} ({:?})", e, line.trim()),
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if console_open {
                        info!("Console closed");
                        console_open = false;
                    }
                    break;
                }
            }
        }

        // Tick the scheduler (delegate-driven, decoupled from the service).
        sched.tick(clock.now_local(), &mut queue);

        // Process all pending events.
        queue.drain(|event| match event {
            Event::ControlTick => app.tick(&mut hw, &mut log_sink),
            Event::TelemetryTick => app.report_telemetry(&mut log_sink),
            Event::ScheduleFired(firing) => app.on_schedule(firing, &mut hw, &mut log_sink),
            Event::Command(cmd) => {
                if let Err(e) = app.handle_command(cmd, &mut hw, &mut log_sink) {
                    warn!("Command failed: {}", e);
                }
            }
        });

        // Config auto-save (5s debounce after last change).
        app.auto_save_if_needed(&settings);

        if should_stop(app.tick_count(), max_ticks, console_open) {
            break;
        }
    }

    app.force_save_if_dirty(&settings);
    app.shutdown(&mut hw);
    info!("Stopped after {} ticks", app.tick_count());
    Ok(())
}

/// The loop ends at the tick limit if one is set, otherwise when the
/// console closes.
fn should_stop(ticks: u64, max_ticks: Option<u64>, console_open: bool) -> bool {
    match max_ticks {
        Some(limit) => ticks >= limit,
        None => !console_open,
    }
}

/// Today's irrigation plan plus a maintenance slot tomorrow.  Entries
/// whose start already passed are skipped.
fn demo_schedule(now: NaiveDateTime) -> Result<Vec<ScheduledEvent>, ScheduleError> {
    let today = now.date();
    let at = |days: i64, h: u32| {
        today
            .and_hms_opt(h, 0, 0)
            .map(|t| t + Duration::days(days))
    };

    let mut plan = Vec::new();
    if let Some(start) = at(0, 6) {
        plan.push(
            ScheduledEvent::irrigation(1, "Morning irrigation", start, ValveState::OPEN)?
                .with_description("Regular morning watering cycle")?,
        );
    }
    if let Some(start) = at(0, 18) {
        plan.push(ScheduledEvent::new(
            2,
            "Evening irrigation",
            start,
            EventKind::Irrigation,
            ValveState::new(true, false),
            20,
        )?);
    }
    if let Some(start) = at(1, 10) {
        plan.push(ScheduledEvent::new(
            3,
            "System maintenance",
            start,
            EventKind::Maintenance,
            ValveState::CLOSED,
            60,
        )?);
    }
    plan.push(
        ScheduledEvent::new(
            4,
            "Fertilizer dosing",
            now + Duration::seconds(45),
            EventKind::Fertilizer,
            ValveState::CLOSED,
            5,
        )?
        .with_description("Nutrient solution injection")?,
    );
    plan.retain(|e| e.start > now);
    Ok(plan)
}
