//! Schedule executor.
//!
//! Holds a small table of calendar events and fires them when their start
//! time comes up.  Like the climate policy it knows nothing about the
//! actuators: it notifies a [`SchedulerDelegate`] and the main loop turns
//! that into an [`Event`](crate::events::Event) for the service.
//!
//! ```text
//!            start - window        start              fired_at + duration
//!  Pending ───────┬──────────────────┬─────────────────────────┬──────────
//!                 │ ◀── fires here ──▶ │                        │
//!                 ▼                                             ▼
//!              Active ───────────────────────────────────────▶ Done
//!  Pending ──(start passes unfired)──▶ Missed
//! ```
//!
//! An event fires `Started` on the first tick where
//! `0 < start - now <= window`; it finishes `duration` minutes after it
//! fired.  Every event fires at most once.

use chrono::{Duration, NaiveDateTime};
use heapless::{String, Vec};
use log::{info, warn};

use crate::app::ports::{ScheduleFiredKind, SchedulerDelegate};
use crate::control::policy::ValveState;
use crate::error::ScheduleError;

/// Maximum number of events held at once.
pub const MAX_EVENTS: usize = 16;
/// Default duration of a new event (minutes).
pub const DEFAULT_DURATION_MINUTES: u16 = 30;

pub const TITLE_CAP: usize = 48;
pub const DESCRIPTION_CAP: usize = 96;

// ═══════════════════════════════════════════════════════════════
//  Event types
// ═══════════════════════════════════════════════════════════════

/// What a scheduled event is for.  Only irrigation drives the valves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Irrigation,
    Maintenance,
    Fertilizer,
}

/// A calendar entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEvent {
    pub id: u32,
    pub title: String<TITLE_CAP>,
    /// Local wall-clock start.
    pub start: NaiveDateTime,
    pub kind: EventKind,
    /// Valves this event opens (irrigation only).
    pub valves: ValveState,
    pub duration_minutes: u16,
    pub description: Option<String<DESCRIPTION_CAP>>,
}

impl ScheduledEvent {
    pub fn new(
        id: u32,
        title: &str,
        start: NaiveDateTime,
        kind: EventKind,
        valves: ValveState,
        duration_minutes: u16,
    ) -> Result<Self, ScheduleError> {
        if duration_minutes == 0 {
            return Err(ScheduleError::ZeroDuration);
        }
        let title = String::try_from(title).map_err(|_| ScheduleError::TextTooLong)?;
        Ok(Self {
            id,
            title,
            start,
            kind,
            valves,
            duration_minutes,
            description: None,
        })
    }

    /// Irrigation event with the default 30-minute duration.
    pub fn irrigation(
        id: u32,
        title: &str,
        start: NaiveDateTime,
        valves: ValveState,
    ) -> Result<Self, ScheduleError> {
        Self::new(id, title, start, EventKind::Irrigation, valves, DEFAULT_DURATION_MINUTES)
    }

    pub fn with_description(mut self, text: &str) -> Result<Self, ScheduleError> {
        self.description = Some(String::try_from(text).map_err(|_| ScheduleError::TextTooLong)?);
        Ok(self)
    }

    pub fn duration(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Scheduled end time.
    pub fn end(&self) -> NaiveDateTime {
        self.start + self.duration()
    }
}

/// Owned summary of a start/finish notification, queued for the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleFiring {
    pub id: u32,
    pub kind: EventKind,
    pub valves: ValveState,
    pub phase: ScheduleFiredKind,
}

impl ScheduleFiring {
    pub fn new(event: &ScheduledEvent, phase: ScheduleFiredKind) -> Self {
        Self {
            id: event.id,
            kind: event.kind,
            valves: event.valves,
            phase,
        }
    }
}

/// Time remaining until `start`, or `None` once it has passed.
pub fn time_until(start: NaiveDateTime, now: NaiveDateTime) -> Option<Duration> {
    let diff = start - now;
    (diff > Duration::zero()).then_some(diff)
}

// ═══════════════════════════════════════════════════════════════
//  Executor
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryState {
    Pending,
    Active { fired_at: NaiveDateTime },
    Done,
    Missed,
}

#[derive(Debug, Clone)]
struct ScheduleEntry {
    event: ScheduledEvent,
    state: EntryState,
}

/// The schedule executor.
pub struct Scheduler {
    entries: Vec<ScheduleEntry, MAX_EVENTS>,
    /// How early before `start` an event may fire.
    window: Duration,
    /// Global enable flag.
    enabled: bool,
}

impl Scheduler {
    pub fn new(window_secs: u32) -> Self {
        Self {
            entries: Vec::new(),
            window: Duration::seconds(i64::from(window_secs)),
            enabled: true,
        }
    }

    /// Add an event.  Ids must be unique.
    ///
    /// When the table is full, the slot of a finished or missed event is
    /// reused.
    pub fn add(&mut self, event: ScheduledEvent) -> Result<(), ScheduleError> {
        if self.entries.iter().any(|e| e.event.id == event.id) {
            return Err(ScheduleError::DuplicateId(event.id));
        }
        if self.entries.is_full() {
            if let Some(idx) = self
                .entries
                .iter()
                .position(|e| matches!(e.state, EntryState::Done | EntryState::Missed))
            {
                let old = self.entries.swap_remove(idx);
                info!(
                    "Scheduler: reclaimed slot of '{}' (id={})",
                    old.event.title, old.event.id
                );
            }
        }
        info!(
            "Scheduler: added '{}' (id={}) at {}",
            event.title, event.id, event.start
        );
        self.entries
            .push(ScheduleEntry {
                event,
                state: EntryState::Pending,
            })
            .map_err(|_| ScheduleError::TableFull)
    }

    /// Remove an event by id.  Returns the removed event, if any.
    ///
    /// Removing an active event does not notify the delegate.
    pub fn remove(&mut self, id: u32) -> Option<ScheduledEvent> {
        let idx = self.entries.iter().position(|e| e.event.id == id)?;
        let entry = self.entries.swap_remove(idx);
        info!("Scheduler: removed '{}' (id={})", entry.event.title, id);
        Some(entry.event)
    }

    /// All events, in no particular order.
    pub fn events(&self) -> impl Iterator<Item = &ScheduledEvent> {
        self.entries.iter().map(|e| &e.event)
    }

    /// Up to `limit` events starting after `now`, soonest first.
    pub fn upcoming(&self, now: NaiveDateTime, limit: usize) -> Vec<&ScheduledEvent, MAX_EVENTS> {
        let mut out: Vec<&ScheduledEvent, MAX_EVENTS> = self
            .entries
            .iter()
            .map(|e| &e.event)
            .filter(|e| e.start > now)
            .collect();
        out.sort_unstable_by_key(|e| e.start);
        out.truncate(limit);
        out
    }

    /// Whether event `id` is currently running.
    pub fn is_active(&self, id: u32) -> bool {
        self.entries
            .iter()
            .any(|e| e.event.id == id && matches!(e.state, EntryState::Active { .. }))
    }

    /// Number of running events.
    pub fn active_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e.state, EntryState::Active { .. }))
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Enable or disable the entire scheduler.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Advance the executor to `now`, notifying `delegate` of every
    /// start and finish.
    pub fn tick(&mut self, now: NaiveDateTime, delegate: &mut dyn SchedulerDelegate) {
        if !self.enabled {
            return;
        }

        for entry in &mut self.entries {
            match entry.state {
                EntryState::Pending => {
                    let until = entry.event.start - now;
                    if until > Duration::zero() && until <= self.window {
                        info!(
                            "Scheduler: '{}' started ({} min)",
                            entry.event.title, entry.event.duration_minutes
                        );
                        delegate.on_schedule_fired(&entry.event, ScheduleFiredKind::Started);
                        entry.state = EntryState::Active { fired_at: now };
                    } else if until <= Duration::zero() {
                        warn!(
                            "Scheduler: '{}' start time {} passed without firing",
                            entry.event.title, entry.event.start
                        );
                        entry.state = EntryState::Missed;
                    }
                }

                EntryState::Active { fired_at } => {
                    if now >= fired_at + entry.event.duration() {
                        info!("Scheduler: '{}' finished", entry.event.title);
                        delegate.on_schedule_fired(&entry.event, ScheduleFiredKind::Finished);
                        entry.state = EntryState::Done;
                    }
                }

                EntryState::Done | EntryState::Missed => {}
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
