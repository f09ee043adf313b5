//! Main-loop event queue.
//!
//! Events are produced by:
//! - The loop timer (control and telemetry ticks)
//! - The schedule executor (event started / finished)
//! - Operator input (commands)
//!
//! Events are consumed by the main control loop, which processes them
//! one at a time in FIFO order.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Loop timer  │────▶│              │     │              │
//! │ Scheduler   │────▶│  Event Queue │────▶│  Main Loop   │
//! │ Operator    │────▶│  (bounded)   │     │  (consumer)  │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```

use heapless::Deque;

use crate::app::commands::AppCommand;
use crate::app::ports::{ScheduleFiredKind, SchedulerDelegate};
use crate::scheduler::{ScheduleFiring, ScheduledEvent};

/// Maximum number of pending events.
pub const EVENT_QUEUE_CAP: usize = 32;

/// System event types.
#[derive(Debug, Clone)]
pub enum Event {
    /// Control loop timer fired.
    ControlTick,
    /// Telemetry report timer fired.
    TelemetryTick,
    /// A scheduled event started or finished.
    ScheduleFired(ScheduleFiring),
    /// Incoming operator command.
    Command(AppCommand),
}

/// Bounded FIFO of pending [`Event`]s.
#[derive(Debug, Default)]
pub struct EventQueue {
    inner: Deque<Event, EVENT_QUEUE_CAP>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { inner: Deque::new() }
    }

    /// Push an event into the queue.
    /// Returns `false` if the queue is full (event dropped).
    pub fn push(&mut self, event: Event) -> bool {
        match self.inner.push_back(event) {
            Ok(()) => true,
            Err(dropped) => {
                log::warn!("Event queue full, dropping {:?}", dropped);
                false
            }
        }
    }

    /// Pop the next event.  Returns `None` if the queue is empty.
    pub fn pop(&mut self) -> Option<Event> {
        self.inner.pop_front()
    }

    /// Drain all pending events into a callback, in FIFO order.
    pub fn drain(&mut self, mut handler: impl FnMut(Event)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Forwards scheduler firings onto the queue.
impl SchedulerDelegate for EventQueue {
    fn on_schedule_fired(&mut self, event: &ScheduledEvent, kind: ScheduleFiredKind) {
        self.push(Event::ScheduleFired(ScheduleFiring::new(event, kind)));
    }
}
