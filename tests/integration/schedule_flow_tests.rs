//! Scheduler → EventQueue → AppService flow, as wired in the main loop.

use chrono::{Duration, NaiveDateTime};

use greenhouse::app::commands::AppCommand;
use greenhouse::app::events::AppEvent;
use greenhouse::app::mode::OperatingMode;
use greenhouse::app::service::AppService;
use greenhouse::config::SystemConfig;
use greenhouse::control::policy::{Valve, ValveState};
use greenhouse::events::{Event, EventQueue};
use greenhouse::scheduler::{EventKind, ScheduledEvent, Scheduler};

use crate::mock_hw::{MockHardware, RecordingSink};

fn at(s: &str) -> NaiveDateTime {
    s.parse().unwrap()
}

struct Rig {
    app: AppService,
    sched: Scheduler,
    queue: EventQueue,
    hw: MockHardware,
    sink: RecordingSink,
}

impl Rig {
    fn new(mode: OperatingMode) -> Self {
        let config = SystemConfig {
            operating_mode: mode,
            ..Default::default()
        };
        let mut hw = MockHardware::reading(24.0, 0.0);
        let mut sink = RecordingSink::new();
        let mut app = AppService::new(config.clone());
        app.start(&mut hw, &mut sink);
        hw.clear();
        Self {
            app,
            sched: Scheduler::new(config.schedule_window_secs),
            queue: EventQueue::new(),
            hw,
            sink,
        }
    }

    /// One main-loop iteration at wall-clock `now`.
    fn step(&mut self, now: NaiveDateTime) {
        self.queue.push(Event::ControlTick);
        self.sched.tick(now, &mut self.queue);
        let Self {
            app,
            queue,
            hw,
            sink,
            ..
        } = self;
        queue.drain(|event| match event {
            Event::ControlTick => app.tick(&mut *hw, &mut *sink),
            Event::TelemetryTick => app.report_telemetry(&mut *sink),
            Event::ScheduleFired(firing) => app.on_schedule(firing, &mut *hw, &mut *sink),
            Event::Command(cmd) => {
                let _ = app.handle_command(cmd, &mut *hw, &mut *sink);
            }
        });
    }
}

fn morning() -> ScheduledEvent {
    ScheduledEvent::irrigation(1, "Morning irrigation", at("2025-01-15T06:00:00"), ValveState::OPEN)
        .unwrap()
}

#[test]
fn scheduled_irrigation_opens_then_closes_valves() {
    let mut rig = Rig::new(OperatingMode::Scheduled);
    rig.sched.add(morning()).unwrap();

    rig.step(at("2025-01-15T05:58:00"));
    assert_eq!(rig.hw.valves(), ValveState::CLOSED);

    rig.step(at("2025-01-15T05:59:30"));
    assert_eq!(rig.hw.valves(), ValveState::OPEN);
    assert_eq!(rig.app.applied().valves, ValveState::OPEN);

    rig.step(at("2025-01-15T06:15:00"));
    assert_eq!(rig.hw.valves(), ValveState::OPEN);

    rig.step(at("2025-01-15T06:29:30"));
    assert_eq!(rig.hw.valves(), ValveState::CLOSED);

    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::ScheduleStarted { id: 1, .. })),
        1
    );
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::ScheduleFinished { id: 1 })),
        1
    );
}

#[test]
fn event_with_one_valve_opens_only_that_valve() {
    let mut rig = Rig::new(OperatingMode::Scheduled);
    let evening = ScheduledEvent::new(
        2,
        "Evening irrigation",
        at("2025-01-15T18:00:00"),
        EventKind::Irrigation,
        ValveState::new(true, false),
        20,
    )
    .unwrap();
    rig.sched.add(evening).unwrap();

    // Operator opened valve 2 by hand beforehand.
    rig.app
        .handle_command(
            AppCommand::SetValve {
                valve: Valve::Secondary,
                open: true,
            },
            &mut rig.hw,
            &mut rig.sink,
        )
        .unwrap();

    rig.step(at("2025-01-15T17:59:10"));
    // valve2 = event includes valve2 = false.
    assert_eq!(rig.hw.valves(), ValveState::new(true, false));

    rig.step(at("2025-01-15T18:19:10"));
    assert_eq!(rig.hw.valves(), ValveState::CLOSED);
}

#[test]
fn overlapping_events_keep_shared_valve_open() {
    let mut rig = Rig::new(OperatingMode::Scheduled);
    rig.sched.add(morning()).unwrap();
    let top_up = ScheduledEvent::new(
        6,
        "Top-up irrigation",
        at("2025-01-15T06:20:00"),
        EventKind::Irrigation,
        ValveState::new(true, false),
        30,
    )
    .unwrap();
    rig.sched.add(top_up).unwrap();

    rig.step(at("2025-01-15T05:59:30"));
    assert_eq!(rig.hw.valves(), ValveState::OPEN);

    // The second event starting must not close valve 2 under the first.
    rig.step(at("2025-01-15T06:19:30"));
    assert_eq!(rig.hw.valves(), ValveState::OPEN);

    // First event ends: valve 1 still belongs to the running one.
    rig.step(at("2025-01-15T06:29:30"));
    assert!(rig.sched.is_active(6));
    assert_eq!(rig.hw.valves(), ValveState::new(true, false));

    rig.step(at("2025-01-15T06:49:30"));
    assert!(!rig.sched.is_active(6));
    assert_eq!(rig.hw.valves(), ValveState::CLOSED);
}

#[test]
fn schedule_ignored_outside_scheduled_mode() {
    let mut rig = Rig::new(OperatingMode::Manual);
    rig.sched.add(morning()).unwrap();

    rig.step(at("2025-01-15T05:59:30"));
    assert!(rig.hw.calls.is_empty());
    // Still reported, even though nothing actuated.
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::ScheduleStarted { .. })),
        1
    );
}

#[test]
fn non_irrigation_events_do_not_actuate() {
    let mut rig = Rig::new(OperatingMode::Scheduled);
    let dosing = ScheduledEvent::new(
        5,
        "Fertilizer dosing",
        at("2025-01-15T09:00:00"),
        EventKind::Fertilizer,
        ValveState::OPEN,
        5,
    )
    .unwrap();
    rig.sched.add(dosing).unwrap();

    rig.step(at("2025-01-15T08:59:30"));
    rig.step(at("2025-01-15T09:05:00"));
    assert!(rig.hw.calls.is_empty());
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::ScheduleFinished { id: 5 })),
        1
    );
}

#[test]
fn each_event_fires_once() {
    let mut rig = Rig::new(OperatingMode::Scheduled);
    rig.sched.add(morning()).unwrap();

    let mut now = at("2025-01-15T05:59:01");
    for _ in 0..40 {
        rig.step(now);
        now += Duration::seconds(2);
    }
    assert_eq!(
        rig.sink
            .count(|e| matches!(e, AppEvent::ScheduleStarted { .. })),
        1
    );
    assert!(rig.sched.is_active(1));
}

#[test]
fn automatic_mode_overrides_schedule_on_next_tick() {
    let mut rig = Rig::new(OperatingMode::Automatic);
    rig.hw.set_reading(20.0, 0.0);
    rig.sched.add(morning()).unwrap();

    rig.step(at("2025-01-15T05:59:30"));
    // Too cold: the policy keeps valves closed and the schedule is ignored.
    assert_eq!(rig.hw.valves(), ValveState::CLOSED);
    assert_eq!(rig.app.applied().fan_speed_percent, 20);
}
