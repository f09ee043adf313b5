//! Fuzz target: `SettingsStore::load`
//!
//! Stores arbitrary bytes as the settings blob and loads them back.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - A successful load always yields an in-range setpoint and fan speed
//! - A loaded config can always be saved again
//!
//! cargo fuzz run fuzz_settings_blob

#![no_main]

use greenhouse::adapters::settings::SettingsStore;
use greenhouse::app::ports::ConfigPort;
use greenhouse::config::setpoint_in_range;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let store = SettingsStore::in_memory();
    if store.write_raw(data).is_err() {
        return;
    }
    if let Ok(cfg) = store.load() {
        assert!(setpoint_in_range(cfg.target_temperature_c));
        assert!(cfg.fan_speed_percent <= 100);
        assert!(store.save(&cfg).is_ok(), "sanitised config must validate");
        let bytes = postcard::to_allocvec(&cfg).unwrap();
        assert!(!bytes.is_empty());
    }
});
