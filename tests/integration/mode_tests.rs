//! Operating modes: automatic policy control, manual commands, safety gating.

use greenhouse::app::commands::AppCommand;
use greenhouse::app::events::AppEvent;
use greenhouse::app::mode::OperatingMode;
use greenhouse::app::service::AppService;
use greenhouse::config::{SystemConfig, validate_config};
use greenhouse::control::policy::{Valve, ValveState};
use greenhouse::error::{CommandError, Error, SafetyFault};

use crate::mock_hw::{MockConfigStore, MockHardware, RecordingSink};

fn service(mode: OperatingMode) -> AppService {
    AppService::new(SystemConfig {
        operating_mode: mode,
        ..Default::default()
    })
}

fn started(mode: OperatingMode, hw: &mut MockHardware, sink: &mut RecordingSink) -> AppService {
    let mut app = service(mode);
    app.start(hw, sink);
    hw.clear();
    app
}

#[test]
fn start_writes_boot_state() {
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let mut app = service(OperatingMode::Manual);
    app.start(&mut hw, &mut sink);

    assert_eq!(hw.valves(), ValveState::CLOSED);
    assert_eq!(hw.fan_percent(), Some(45));
    assert!(matches!(sink.events[0], AppEvent::Started(OperatingMode::Manual)));
}

#[test]
fn automatic_tick_applies_policy() {
    let mut hw = MockHardware::reading(27.0, 5.0);
    let mut sink = RecordingSink::new();
    let mut app = started(OperatingMode::Automatic, &mut hw, &mut sink);

    app.tick(&mut hw, &mut sink);

    assert_eq!(hw.valves(), ValveState::OPEN);
    assert_eq!(hw.fan_percent(), Some(60));
    assert_eq!(app.applied().fan_speed_percent, 60);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::ActuationApplied(_))),
        1
    );
}

#[test]
fn valves_follow_hysteresis_across_ticks() {
    let mut hw = MockHardware::reading(26.5, 0.0);
    let mut sink = RecordingSink::new();
    let mut app = started(OperatingMode::Automatic, &mut hw, &mut sink);

    app.tick(&mut hw, &mut sink);
    assert_eq!(app.applied().valves, ValveState::OPEN);

    // Back inside the band: hold.
    hw.set_reading(23.0, 0.0);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.applied().valves, ValveState::OPEN);
    assert_eq!(app.applied().fan_speed_percent, 45);

    // Below the band: close.
    hw.set_reading(21.5, 0.0);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.applied().valves, ValveState::CLOSED);
    assert_eq!(app.applied().fan_speed_percent, 30);

    // Inside the band again: stays closed.
    hw.set_reading(25.0, 0.0);
    app.tick(&mut hw, &mut sink);
    assert_eq!(hw.valves(), ValveState::CLOSED);
}

#[test]
fn high_wind_caps_fan() {
    let mut hw = MockHardware::reading(28.0, 20.0);
    let mut sink = RecordingSink::new();
    let mut app = started(OperatingMode::Automatic, &mut hw, &mut sink);

    app.tick(&mut hw, &mut sink);
    assert_eq!(hw.fan_percent(), Some(20));
    assert_eq!(hw.valves(), ValveState::OPEN);
}

#[test]
fn manual_mode_tick_does_not_actuate() {
    let mut hw = MockHardware::reading(35.0, 0.0);
    let mut sink = RecordingSink::new();
    let mut app = started(OperatingMode::Manual, &mut hw, &mut sink);

    for _ in 0..5 {
        app.tick(&mut hw, &mut sink);
    }
    assert!(hw.calls.is_empty());
    assert_eq!(app.tick_count(), 5);
}

#[test]
fn manual_commands_rejected_in_automatic() {
    let mut hw = MockHardware::reading(24.0, 0.0);
    let mut sink = RecordingSink::new();
    let mut app = started(OperatingMode::Automatic, &mut hw, &mut sink);

    for cmd in [
        AppCommand::ToggleValve(Valve::Main),
        AppCommand::SetValve {
            valve: Valve::Secondary,
            open: true,
        },
        AppCommand::SetFanSpeed(90),
    ] {
        let err = app.handle_command(cmd, &mut hw, &mut sink).unwrap_err();
        assert_eq!(err, Error::Command(CommandError::AutomaticModeActive));
    }

    assert!(hw.calls.is_empty());
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::CommandRejected(_))),
        3
    );
}

#[test]
fn manual_toggle_and_fan() {
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let mut app = started(OperatingMode::Manual, &mut hw, &mut sink);

    app.handle_command(AppCommand::ToggleValve(Valve::Main), &mut hw, &mut sink)
        .unwrap();
    assert_eq!(hw.valves(), ValveState::new(true, false));

    app.handle_command(AppCommand::ToggleValve(Valve::Main), &mut hw, &mut sink)
        .unwrap();
    assert_eq!(hw.valves(), ValveState::CLOSED);

    app.handle_command(AppCommand::SetFanSpeed(150), &mut hw, &mut sink)
        .unwrap();
    assert_eq!(hw.fan_percent(), Some(100));
    assert_eq!(app.current_config().fan_speed_percent, 100);
}

#[test]
fn switching_to_automatic_takes_over_on_next_tick() {
    let mut hw = MockHardware::reading(27.0, 0.0);
    let mut sink = RecordingSink::new();
    let mut app = started(OperatingMode::Manual, &mut hw, &mut sink);

    app.handle_command(
        AppCommand::SetMode(OperatingMode::Automatic),
        &mut hw,
        &mut sink,
    )
    .unwrap();
    assert!(hw.calls.is_empty());
    assert!(sink.events.iter().any(|e| matches!(
        e,
        AppEvent::ModeChanged {
            from: OperatingMode::Manual,
            to: OperatingMode::Automatic
        }
    )));

    app.tick(&mut hw, &mut sink);
    assert_eq!(hw.valves(), ValveState::OPEN);
}

#[test]
fn setting_same_mode_is_silent() {
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let mut app = started(OperatingMode::Manual, &mut hw, &mut sink);
    sink.events.clear();

    app.handle_command(AppCommand::SetMode(OperatingMode::Manual), &mut hw, &mut sink)
        .unwrap();
    assert!(sink.events.is_empty());
    assert!(!app.is_config_dirty());
}

#[test]
fn invalid_temperature_suspends_policy_until_recovered() {
    let mut hw = MockHardware::reading(f32::NAN, 0.0);
    let mut sink = RecordingSink::new();
    let mut app = started(OperatingMode::Automatic, &mut hw, &mut sink);

    app.tick(&mut hw, &mut sink);
    app.tick(&mut hw, &mut sink);
    assert!(hw.calls.is_empty());
    assert_eq!(app.fault_flags(), SafetyFault::TemperatureInvalid.mask());
    assert_eq!(sink.count(|e| matches!(e, AppEvent::FaultDetected(_))), 1);

    hw.set_reading(27.0, 0.0);
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.fault_flags(), 0);
    assert_eq!(sink.count(|e| matches!(e, AppEvent::FaultCleared)), 1);
    assert_eq!(hw.valves(), ValveState::OPEN);
}

#[test]
fn negative_wind_is_a_fault() {
    let mut hw = MockHardware::reading(27.0, -4.0);
    let mut sink = RecordingSink::new();
    let mut app = started(OperatingMode::Automatic, &mut hw, &mut sink);

    app.tick(&mut hw, &mut sink);
    assert_eq!(app.fault_flags(), SafetyFault::WindInvalid.mask());
    assert!(hw.calls.is_empty());
}

#[test]
fn setpoint_change_moves_policy_error() {
    let mut hw = MockHardware::reading(27.0, 0.0);
    let mut sink = RecordingSink::new();
    let mut app = started(OperatingMode::Automatic, &mut hw, &mut sink);

    app.handle_command(AppCommand::SetTargetTemperature(27.0), &mut hw, &mut sink)
        .unwrap();
    app.tick(&mut hw, &mut sink);
    assert_eq!(app.applied().fan_speed_percent, 45);
    assert_eq!(app.applied().valves, ValveState::CLOSED);
}

#[test]
fn config_auto_saves_after_debounce() {
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let store = MockConfigStore::new();
    let mut app = started(OperatingMode::Manual, &mut hw, &mut sink);

    app.handle_command(AppCommand::SetTargetTemperature(26.0), &mut hw, &mut sink)
        .unwrap();
    assert!(app.is_config_dirty());

    // 2 s loop: two ticks is 4 s, still inside the debounce.
    app.tick(&mut hw, &mut sink);
    app.tick(&mut hw, &mut sink);
    assert!(!app.auto_save_if_needed(&store));

    app.tick(&mut hw, &mut sink);
    assert!(app.auto_save_if_needed(&store));
    assert_eq!(store.save_count(), 1);
    assert_eq!(store.saved.borrow()[0].target_temperature_c, 26.0);
    assert!(!app.is_config_dirty());
}

#[test]
fn auto_save_waits_for_last_change() {
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let store = MockConfigStore::new();
    let mut app = started(OperatingMode::Manual, &mut hw, &mut sink);

    app.handle_command(AppCommand::SetTargetTemperature(25.0), &mut hw, &mut sink)
        .unwrap();
    app.tick(&mut hw, &mut sink);
    app.tick(&mut hw, &mut sink);
    app.handle_command(AppCommand::SetTargetTemperature(26.0), &mut hw, &mut sink)
        .unwrap();

    // 6 s after the first change, 2 s after the second: not yet.
    app.tick(&mut hw, &mut sink);
    assert!(!app.auto_save_if_needed(&store));
    app.tick(&mut hw, &mut sink);
    assert!(!app.auto_save_if_needed(&store));

    app.tick(&mut hw, &mut sink);
    assert!(app.auto_save_if_needed(&store));
    assert_eq!(store.saved.borrow()[0].target_temperature_c, 26.0);
}

#[test]
fn save_command_skips_the_delay() {
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let store = MockConfigStore::new();
    let mut app = started(OperatingMode::Manual, &mut hw, &mut sink);

    app.handle_command(AppCommand::SetTargetTemperature(22.0), &mut hw, &mut sink)
        .unwrap();
    app.handle_command(AppCommand::SaveConfig, &mut hw, &mut sink)
        .unwrap();
    assert!(app.auto_save_if_needed(&store));
    assert_eq!(store.save_count(), 1);

    // The next change waits the full delay again.
    app.handle_command(AppCommand::SetTargetTemperature(23.0), &mut hw, &mut sink)
        .unwrap();
    app.tick(&mut hw, &mut sink);
    assert!(!app.auto_save_if_needed(&store));
}

#[test]
fn invalid_runtime_config_is_rejected() {
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let store = MockConfigStore::new();
    let mut app = started(OperatingMode::Manual, &mut hw, &mut sink);
    let before = app.current_config();

    let bad = SystemConfig {
        fan_speed_percent: 150,
        control_loop_interval_ms: 0,
        ..Default::default()
    };
    let err = app
        .handle_command(AppCommand::UpdateConfig(bad), &mut hw, &mut sink)
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Command(CommandError::InvalidConfig(_))
    ));
    assert_eq!(app.current_config(), before);
    assert!(!app.is_config_dirty());
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::CommandRejected(CommandError::InvalidConfig(_)))),
        1
    );

    let nan = SystemConfig {
        target_temperature_c: f32::NAN,
        ..Default::default()
    };
    let err = app
        .handle_command(AppCommand::UpdateConfig(nan), &mut hw, &mut sink)
        .unwrap_err();
    assert_eq!(err, Error::Command(CommandError::NonFiniteSetpoint));

    // A valid update still goes through and saves on schedule.
    let good = SystemConfig {
        fan_speed_percent: 70,
        control_loop_interval_ms: 1000,
        ..Default::default()
    };
    app.handle_command(AppCommand::UpdateConfig(good), &mut hw, &mut sink)
        .unwrap();
    for _ in 0..5 {
        app.tick(&mut hw, &mut sink);
    }
    assert!(app.auto_save_if_needed(&store));
    assert_eq!(validate_config(&store.saved.borrow()[0]), Ok(()));
}

#[test]
fn failed_save_keeps_config_dirty() {
    let mut hw = MockHardware::new();
    let mut sink = RecordingSink::new();
    let store = MockConfigStore {
        fail: true,
        ..Default::default()
    };
    let mut app = started(OperatingMode::Manual, &mut hw, &mut sink);

    app.handle_command(AppCommand::SetMode(OperatingMode::Scheduled), &mut hw, &mut sink)
        .unwrap();
    app.force_save_if_dirty(&store);
    assert!(app.is_config_dirty());
}

#[test]
fn telemetry_tracks_latest_frame() {
    let mut hw = MockHardware::reading(26.0, 12.0);
    let mut sink = RecordingSink::new();
    let mut app = started(OperatingMode::Automatic, &mut hw, &mut sink);

    app.tick(&mut hw, &mut sink);
    app.report_telemetry(&mut sink);

    let Some(AppEvent::Telemetry(t)) = sink.events.last() else {
        panic!("expected telemetry");
    };
    assert_eq!(t.tick, 1);
    assert_eq!(t.readings.temperature, 26.0);
    assert_eq!(t.readings.wind_speed, 12.0);
    assert_eq!(t.fan_speed, 60);
    assert_eq!(t.mode, OperatingMode::Automatic);
}
