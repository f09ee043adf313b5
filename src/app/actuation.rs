//! Bounded actuation command queue.
//!
//! Every actuator write, whether from the climate policy, an operator
//! command or a schedule event, is queued here and applied in FIFO order
//! by [`ActuationQueue::flush`].  The queue is an `embassy-sync` channel
//! so the same type can later sit between an async command task and the
//! control loop.
//!
//! ```text
//!  policy / command / schedule ──▶ ┌──────────────┐ ──flush──▶ ActuatorPort
//!                                  │ Channel<_, 8>│
//!                                  └──────────────┘
//! ```
//!
//! A full queue rejects the push and hands the command back; the caller
//! flushes and retries.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use log::debug;
use serde::Serialize;

use crate::control::policy::{ActuationDecision, Valve, ValveState};

use super::ports::ActuatorPort;

/// Channel depth for pending actuator writes.
pub const ACTUATION_DEPTH: usize = 8;

/// A single actuator write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuationCommand {
    SetValve { valve: Valve, open: bool },
    SetFan { percent: u8 },
}

/// The actuator state last written to the hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedState {
    pub valves: ValveState,
    pub fan_speed_percent: u8,
}

pub struct ActuationQueue {
    channel: Channel<CriticalSectionRawMutex, ActuationCommand, ACTUATION_DEPTH>,
    applied: AppliedState,
}

impl ActuationQueue {
    pub fn new(initial: AppliedState) -> Self {
        Self {
            channel: Channel::new(),
            applied: initial,
        }
    }

    /// Queue one write.  Returns the command back if the queue is full.
    pub fn push(&self, cmd: ActuationCommand) -> Result<(), ActuationCommand> {
        self.channel.try_send(cmd).map_err(|e| match e {
            TrySendError::Full(cmd) => cmd,
        })
    }

    /// Queue the writes for a policy decision: valve 1, valve 2, then fan.
    ///
    /// Flushes into `hw` first if there is not enough room for all three.
    pub fn enqueue_decision(&mut self, decision: &ActuationDecision, hw: &mut impl ActuatorPort) {
        let cmds = [
            ActuationCommand::SetValve {
                valve: Valve::Main,
                open: decision.valve1_open,
            },
            ActuationCommand::SetValve {
                valve: Valve::Secondary,
                open: decision.valve2_open,
            },
            ActuationCommand::SetFan {
                percent: decision.fan_speed_percent,
            },
        ];
        for cmd in cmds {
            self.push_or_flush(cmd, hw);
        }
    }

    /// Queue `cmd`, flushing into `hw` once if the queue is full.
    pub fn push_or_flush(&mut self, cmd: ActuationCommand, hw: &mut impl ActuatorPort) {
        if let Err(cmd) = self.push(cmd) {
            debug!("Actuation queue full, flushing before {:?}", cmd);
            self.flush(hw);
            // The queue is empty after a flush.
            let _ = self.push(cmd);
        }
    }

    /// Apply every queued write to `hw` in order.
    /// Returns `true` if the applied state changed.
    pub fn flush(&mut self, hw: &mut impl ActuatorPort) -> bool {
        let before = self.applied;
        while let Ok(cmd) = self.channel.try_receive() {
            match cmd {
                ActuationCommand::SetValve { valve, open } => {
                    hw.set_valve(valve, open);
                    self.applied.valves = self.applied.valves.with(valve, open);
                }
                ActuationCommand::SetFan { percent } => {
                    let percent = percent.min(100);
                    hw.set_fan_speed(percent);
                    self.applied.fan_speed_percent = percent;
                }
            }
        }
        self.applied != before
    }

    /// State after the last flush.
    pub fn applied(&self) -> AppliedState {
        self.applied
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}
