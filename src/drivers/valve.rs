//! Solenoid irrigation valve driver.
//!
//! A dumb on/off actuator.  Who may open a valve is decided upstream by
//! the operating mode; this driver only tracks state and counts
//! transitions for diagnostics.

use log::debug;

use crate::control::policy::Valve;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValvePosition {
    Closed,
    Open,
}

pub struct ValveDriver {
    valve: Valve,
    position: ValvePosition,
    /// Number of open/close transitions since boot.
    cycles: u32,
}

impl ValveDriver {
    pub fn new(valve: Valve) -> Self {
        Self {
            valve,
            position: ValvePosition::Closed,
            cycles: 0,
        }
    }

    pub fn set(&mut self, open: bool) {
        let target = if open {
            ValvePosition::Open
        } else {
            ValvePosition::Closed
        };
        if target == self.position {
            return;
        }
        debug!("{}: {:?} -> {:?}", self.valve, self.position, target);
        self.position = target;
        self.cycles = self.cycles.wrapping_add(1);
    }

    pub fn close(&mut self) {
        self.set(false);
    }

    pub fn is_open(&self) -> bool {
        self.position == ValvePosition::Open
    }

    pub fn position(&self) -> ValvePosition {
        self.position
    }

    pub fn cycles(&self) -> u32 {
        self.cycles
    }
}
