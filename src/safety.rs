//! Safety supervisor.
//!
//! The supervisor runs **every tick before the climate policy** and keeps
//! a latched fault bitmask.  The policy is total only over finite inputs
//! with a sane setpoint, so any fault suppresses automatic control until
//! the offending input recovers.
//!
//! ## Fault lifecycle
//!
//! 1. A reading fails validation (e.g. the temperature is NaN).
//! 2. The supervisor sets the corresponding bit and logs it once.
//! 3. The service skips policy evaluation; the last applied actuator
//!    state is held.
//! 4. Each tick the supervisor re-evaluates and unsets bits whose
//!    condition cleared.
//! 5. When the mask returns to zero, automatic control resumes.

use crate::config::setpoint_in_range;
use crate::control::policy::SensorSnapshot;
use crate::error::SafetyFault;
use log::{error, info};

/// Safety supervisor.
#[derive(Debug, Default)]
pub struct SafetySupervisor {
    /// Latched fault bitmask.
    faults: u8,
}

impl SafetySupervisor {
    pub fn new() -> Self {
        Self { faults: 0 }
    }

    /// Evaluate all input conditions against the latest policy snapshot.
    /// Returns the updated fault bitmask.
    pub fn evaluate(&mut self, snap: &SensorSnapshot) -> u8 {
        self.eval_fault(
            SafetyFault::TemperatureInvalid,
            !snap.temperature_c.is_finite(),
        );

        self.eval_fault(
            SafetyFault::SetpointInvalid,
            !setpoint_in_range(snap.target_temperature_c),
        );

        self.eval_fault(
            SafetyFault::WindInvalid,
            !(snap.wind_speed_kmh.is_finite() && snap.wind_speed_kmh >= 0.0),
        );

        self.faults
    }

    /// Current fault bitmask.
    pub fn faults(&self) -> u8 {
        self.faults
    }

    /// True if **any** fault is active.
    pub fn has_faults(&self) -> bool {
        self.faults != 0
    }

    /// Check if a specific fault is active.
    pub fn has_fault(&self, fault: SafetyFault) -> bool {
        self.faults & fault.mask() != 0
    }

    // ── Internal ──────────────────────────────────────────────────

    /// Set or clear a fault bit based on a boolean condition.
    fn eval_fault(&mut self, fault: SafetyFault, condition: bool) {
        if condition {
            if self.faults & fault.mask() == 0 {
                error!("SAFETY FAULT SET: {fault}");
            }
            self.faults |= fault.mask();
        } else {
            if self.faults & fault.mask() != 0 {
                info!("SAFETY FAULT CLEARED: {fault}");
            }
            self.faults &= !fault.mask();
        }
    }
}
