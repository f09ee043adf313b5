//! Persistent settings adapter.
//!
//! Implements [`ConfigPort`] by storing [`SystemConfig`] as a `postcard`
//! blob, either in memory (EEPROM simulation, tests) or in a file.
//!
//! - `save` range-checks every field and rejects bad values.
//! - `load` never fails on bad *values*: each out-of-range field falls back
//!   to its default and a warning is logged.  Only an unreadable blob is
//!   reported as [`ConfigError::Corrupted`].

use std::cell::RefCell;
use std::path::PathBuf;

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::{
    LOOP_INTERVAL_MS, SCHEDULE_WINDOW_SECS, SystemConfig, TELEMETRY_INTERVAL_SECS,
    setpoint_in_range, validate_config,
};

enum Backend {
    Memory(RefCell<Option<Vec<u8>>>),
    File(PathBuf),
}

pub struct SettingsStore {
    backend: Backend,
}

impl SettingsStore {
    /// Volatile store, lost on drop.
    pub fn in_memory() -> Self {
        info!("SettingsStore: in-memory backend");
        Self {
            backend: Backend::Memory(RefCell::new(None)),
        }
    }

    /// Store backed by the file at `path`.  The file is created on first save.
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("SettingsStore: file backend at {}", path.display());
        Self {
            backend: Backend::File(path),
        }
    }

    /// Write a raw blob, bypassing validation.
    pub fn write_raw(&self, bytes: &[u8]) -> Result<(), ConfigError> {
        match &self.backend {
            Backend::Memory(cell) => {
                *cell.borrow_mut() = Some(bytes.to_vec());
                Ok(())
            }
            Backend::File(path) => std::fs::write(path, bytes).map_err(|e| {
                warn!("SettingsStore: write {} failed: {}", path.display(), e);
                ConfigError::IoError
            }),
        }
    }

    fn read_raw(&self) -> Result<Vec<u8>, ConfigError> {
        match &self.backend {
            Backend::Memory(cell) => cell.borrow().clone().ok_or(ConfigError::NotFound),
            Backend::File(path) => match std::fs::read(path) {
                Ok(bytes) => Ok(bytes),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ConfigError::NotFound),
                Err(e) => {
                    warn!("SettingsStore: read {} failed: {}", path.display(), e);
                    Err(ConfigError::IoError)
                }
            },
        }
    }
}

// ── Sanitising ────────────────────────────────────────────

/// Replace every invalid field with its default.
fn sanitize(mut cfg: SystemConfig) -> SystemConfig {
    let defaults = SystemConfig::default();
    if !setpoint_in_range(cfg.target_temperature_c) {
        warn!(
            "SettingsStore: stored setpoint {} invalid, using {}",
            cfg.target_temperature_c, defaults.target_temperature_c
        );
        cfg.target_temperature_c = defaults.target_temperature_c;
    }
    if cfg.fan_speed_percent > 100 {
        warn!(
            "SettingsStore: stored fan speed {} invalid, using {}",
            cfg.fan_speed_percent, defaults.fan_speed_percent
        );
        cfg.fan_speed_percent = defaults.fan_speed_percent;
    }
    if !LOOP_INTERVAL_MS.contains(&cfg.control_loop_interval_ms) {
        cfg.control_loop_interval_ms = defaults.control_loop_interval_ms;
    }
    if !TELEMETRY_INTERVAL_SECS.contains(&cfg.telemetry_interval_secs) {
        cfg.telemetry_interval_secs = defaults.telemetry_interval_secs;
    }
    if !SCHEDULE_WINDOW_SECS.contains(&cfg.schedule_window_secs) {
        cfg.schedule_window_secs = defaults.schedule_window_secs;
    }
    cfg
}

impl ConfigPort for SettingsStore {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let bytes = match self.read_raw() {
            Ok(bytes) => bytes,
            Err(ConfigError::NotFound) => {
                info!("SettingsStore: no stored config, using defaults");
                return Ok(SystemConfig::default());
            }
            Err(e) => return Err(e),
        };
        let cfg: SystemConfig = postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
        info!("SettingsStore: loaded config ({} bytes)", bytes.len());
        Ok(sanitize(cfg))
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        validate_config(config).map_err(ConfigError::ValidationFailed)?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;
        self.write_raw(&bytes)?;
        info!("SettingsStore: config saved ({} bytes)", bytes.len());
        Ok(())
    }
}
